/// 將基礎提示詞與該列的訊息組合成單一提示字串
///
/// The message is wrapped in a `"""` delimiter to bound the user content
/// within the template. Embedded delimiter sequences in the message pass
/// through unchanged; callers that need stricter escaping swap it here.
pub fn build_prompt(base_prompt: &str, message: &str) -> String {
    format!("{}\n\"\"\"{}\"\"\"", base_prompt, message)
}
