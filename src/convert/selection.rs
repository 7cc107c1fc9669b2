use crate::collab::export::ImageDescriptor;
use crate::convert::converter::Converter;
use crate::convert::state::{BuildState, ConvertedSkeleton, Diagnostic, DiagnosticKind};
use crate::foundation::error::RigError;
use crate::scene::model::{Document, Element};

/// A top-level item that could not be converted.
#[derive(Debug)]
pub struct ItemFailure {
    pub item: String,
    pub error: RigError,
}

/// Outcome of converting a selection.
#[derive(Debug, Default)]
pub struct SelectionReport {
    pub skeletons: Vec<ConvertedSkeleton>,
    pub failures: Vec<ItemFailure>,
}

impl SelectionReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.skeletons.iter().flat_map(|s| &s.diagnostics)
    }

    /// Every exported image, one entry per skeleton that uses it.
    pub fn manifest(&self) -> impl Iterator<Item = &ImageDescriptor> {
        self.skeletons.iter().flat_map(|s| &s.images)
    }
}

/// Convert every item of `targets`.
///
/// A failing item is reported and skipped. In merge mode all items share one build state,
/// and a failing item's partial writes are rolled back before the next item runs.
#[tracing::instrument(skip_all, fields(items = targets.len()))]
pub fn convert_selection(
    converter: &mut Converter<'_>,
    doc: &Document,
    targets: &[Element],
) -> SelectionReport {
    let mut report = SelectionReport::default();

    if converter.config().merge_skeletons {
        let mut state = BuildState::new(converter.config().merged_name.clone());
        let mut converted = 0usize;
        for element in targets {
            let snapshot = state.clone();
            match converter.convert_item(&mut state, doc, element) {
                Ok(()) => converted += 1,
                Err(error) => {
                    state = snapshot;
                    let item = display_name(element);
                    state.diagnose(
                        DiagnosticKind::ItemFailed,
                        format!("'{item}' skipped: {error}"),
                    );
                    report.failures.push(ItemFailure { item, error });
                }
            }
        }
        if converted > 0 {
            report.skeletons.push(state.finish());
        }
        return report;
    }

    for element in targets {
        let result = converter.item_name(element).and_then(|name| {
            let mut state = BuildState::new(name);
            converter.convert_item(&mut state, doc, element)?;
            Ok(state.finish())
        });
        match result {
            Ok(skeleton) => report.skeletons.push(skeleton),
            Err(error) => {
                let item = display_name(element);
                tracing::error!(item = %item, error = %error, "item conversion failed");
                report.failures.push(ItemFailure { item, error });
            }
        }
    }
    report
}

fn display_name(element: &Element) -> String {
    if !element.name.is_empty() {
        element.name.clone()
    } else {
        element.item_name().unwrap_or("<unnamed>").to_string()
    }
}
