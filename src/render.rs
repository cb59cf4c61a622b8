//! Document rendering seam.
//!
//! The [`DocumentRenderer`] trait is the capability boundary between the
//! batch orchestrator and the template-fill machinery. The orchestrator
//! treats rendering as an opaque, possibly slow, single-call operation with
//! no retry; everything behind the trait is swappable, which is what lets
//! the orchestrator tests run against a mock instead of real DOCX packing.
//!
//! The production implementation is [`DocxRenderer`], a thin delegation to
//! [`TemplateDoc::fill`](crate::template::TemplateDoc::fill).

use thiserror::Error;

use crate::source::RowContext;
use crate::template::{TemplateDoc, TemplateError};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("render failed: {0}")]
    Template(#[from] TemplateError),
}

/// Trait for document rendering backends.
///
/// `render` must be a pure function of the template and the context:
/// calling it twice with the same inputs yields byte-identical output.
pub trait DocumentRenderer {
    /// Fill `template` with `context`, returning the rendered document bytes.
    fn render(&self, template: &TemplateDoc, context: &RowContext) -> Result<Vec<u8>, RenderError>;
}

/// Production renderer: fills the DOCX container in process.
#[derive(Debug, Default)]
pub struct DocxRenderer;

impl DocumentRenderer for DocxRenderer {
    fn render(&self, template: &TemplateDoc, context: &RowContext) -> Result<Vec<u8>, RenderError> {
        Ok(template.fill(context)?)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Mock renderer that records contexts and returns canned bytes.
    ///
    /// Rendering fails for any context that contains a cell with the value
    /// `"FAIL"`, which is how orchestrator tests mark a poison row.
    #[derive(Default)]
    pub struct MockRenderer {
        pub rendered: RefCell<Vec<RowContext>>,
    }

    impl MockRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn render_count(&self) -> usize {
            self.rendered.borrow().len()
        }
    }

    impl DocumentRenderer for MockRenderer {
        fn render(
            &self,
            _template: &TemplateDoc,
            context: &RowContext,
        ) -> Result<Vec<u8>, RenderError> {
            self.rendered.borrow_mut().push(context.clone());
            if context.values().any(|v| v == "FAIL") {
                return Err(RenderError::Template(TemplateError::InvalidPart(
                    "word/document.xml".to_string(),
                )));
            }
            // Identifiable canned output: the context values joined.
            let joined: Vec<&str> = context.values().map(String::as_str).collect();
            Ok(joined.join("|").into_bytes())
        }
    }

    #[test]
    fn mock_records_contexts_in_order() {
        let renderer = MockRenderer::new();
        let template = crate::test_helpers::fixture_template(&["x"]);
        let a = RowContext::from([("k".to_string(), "1".to_string())]);
        let b = RowContext::from([("k".to_string(), "2".to_string())]);

        renderer.render(&template, &a).unwrap();
        renderer.render(&template, &b).unwrap();

        assert_eq!(renderer.render_count(), 2);
        assert_eq!(renderer.rendered.borrow()[0]["k"], "1");
        assert_eq!(renderer.rendered.borrow()[1]["k"], "2");
    }

    #[test]
    fn mock_fails_on_poison_value() {
        let renderer = MockRenderer::new();
        let template = crate::test_helpers::fixture_template(&["x"]);
        let poisoned = RowContext::from([("k".to_string(), "FAIL".to_string())]);
        assert!(renderer.render(&template, &poisoned).is_err());
    }

    #[test]
    fn docx_renderer_delegates_to_fill() {
        let template = crate::test_helpers::fixture_template(&["Hallo {Name}"]);
        let context = RowContext::from([("Name".to_string(), "Anna".to_string())]);
        let rendered = DocxRenderer.render(&template, &context).unwrap();
        assert_eq!(rendered, template.fill(&context).unwrap());
    }
}
