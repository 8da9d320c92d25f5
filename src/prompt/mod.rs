//! Prompt 组装

use crate::context::ContextAnnotation;
use crate::models::TranslationDirection;

pub const PROMPT_INSTRUCTIONS_ENG_TO_DOGGO: &str = "Please translate the following message from English to Doggolingo using the context provided, without any additional text or commentary. Message: ";

pub const PROMPT_INSTRUCTIONS_DOGGO_TO_ENG: &str = "Please translate the following message from Doggolingo to English using the context provided, without any additional text or commentary. Message: ";

/// 方向对应的指令模板
pub fn instruction_template(direction: TranslationDirection) -> &'static str {
    match direction {
        TranslationDirection::EnglishToDoggo => PROMPT_INSTRUCTIONS_ENG_TO_DOGGO,
        TranslationDirection::DoggoToEnglish => PROMPT_INSTRUCTIONS_DOGGO_TO_ENG,
    }
}

/// 指令 + 消息 + 上下文
///
/// 消息原样拼接，不做转义。
pub fn compose(
    message: &str,
    annotation: &ContextAnnotation,
    direction: TranslationDirection,
) -> String {
    let instructions = instruction_template(direction);
    let mut prompt =
        String::with_capacity(instructions.len() + message.len() + annotation.as_str().len());
    prompt.push_str(instructions);
    prompt.push_str(message);
    prompt.push_str(annotation.as_str());
    prompt
}
