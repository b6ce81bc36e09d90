//! Context assembly for prompts

use crate::rag::document::RankedResult;

/// Serializes ranked results into a text block no longer than a
/// character budget.
///
/// Each result renders as `Title: {title}\nContent: {content}\n\n`. Blocks
/// are never cut: the first block that would overflow the budget ends the
/// build.
#[derive(Debug, Clone, Copy)]
pub struct ContextBuilder {
    max_chars: usize,
}

impl ContextBuilder {
    /// Create a builder with a budget in characters
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Character budget
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Render one result
    pub fn render_block(result: &RankedResult) -> String {
        format!(
            "Title: {}\nContent: {}\n\n",
            result.document.title(),
            result.document.content
        )
    }

    /// Concatenate the blocks that fit, in the given order
    pub fn build(&self, results: &[RankedResult]) -> String {
        self.build_counted(results).0
    }

    /// Like [`build`](Self::build), also returning how many leading results
    /// made it into the text
    pub fn build_counted(&self, results: &[RankedResult]) -> (String, usize) {
        let mut context = String::new();
        let mut current = 0usize;
        let mut included = 0usize;

        for result in results {
            let block = Self::render_block(result);
            let len = block.chars().count();
            if current + len > self.max_chars {
                break;
            }
            context.push_str(&block);
            current += len;
            included += 1;
        }

        (context, included)
    }
}
