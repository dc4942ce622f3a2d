//! Fixed instruction text sent with every calibration.

use mirror_core::catalog::CatalogIndex;
use std::fmt::Write;

const INSTRUCTION_HEAD: &str = "你是一位精通意识法则的大师，擅长透过全息影相剥离幻象，帮助来访者收回力量。
请只返回一个 JSON 对象，不要输出任何其他文字，字段如下：
- frequencyScan: 字符串，对用户烦恼的频率扫描结论
- illusionStripping: 字符串，揭示烦恼背后的幻象
- fiveSteps: 恰好 5 个字符串组成的数组，收回力量的五步曲
- actionAnchor: 字符串，一个立即可做的行动锚点
- recommendedBookTitle: 字符串，必须从下方书单中原样选择一本
- recommendedMusicTitle: 字符串，必须从下方音乐列表中原样选择一首";

/// Builds the system instruction, listing the catalog so that the backend
/// recommends titles the resolver can match.
pub fn build_system_instruction(catalog: &CatalogIndex) -> String {
    let mut instruction = String::from(INSTRUCTION_HEAD);

    instruction.push_str("\n\n书单：\n");
    for book in catalog.books() {
        let _ = writeln!(instruction, "- {}（{}）", book.title, book.author);
    }

    instruction.push_str("\n音乐列表：\n");
    for track in catalog.tracks() {
        let _ = writeln!(instruction, "- {}", track.title);
    }

    instruction
}

/// Wraps the user's text in the request prompt.
pub fn user_prompt(input_text: &str) -> String {
    format!("用户烦恼：\"{input_text}\"。请进行深度频率校准。")
}
