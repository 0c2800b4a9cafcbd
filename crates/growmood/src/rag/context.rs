//! Renders retrieved chunks into origin-tagged prompt blocks

pub const MENU_TAG: &str = "food";
pub const RESEARCH_TAG: &str = "research";

/// Wrap chunk `i` in `<{tag}_{i}>` ... `</{tag}_{i}>`, one block per chunk.
///
/// Chunk text is XML-escaped, so a chunk can never contain a literal tag
/// boundary of its own or of any other block.
pub fn assemble<S: AsRef<str>>(tag: &str, chunks: &[S]) -> String {
  chunks
    .iter()
    .enumerate()
    .map(|(i, chunk)| format!("<{tag}_{i}>\n{}\n</{tag}_{i}>", escape(chunk.as_ref())))
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn menu_context<S: AsRef<str>>(chunks: &[S]) -> String {
  assemble(MENU_TAG, chunks)
}

pub fn research_context<S: AsRef<str>>(chunks: &[S]) -> String {
  assemble(RESEARCH_TAG, chunks)
}

fn escape(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      _ => escaped.push(c),
    }
  }
  escaped
}
