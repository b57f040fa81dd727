use super::model::{CaptureKind, CaptureStatus, CaptureSummary};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Filter and ordering applied to the capture list
#[derive(Debug, Clone, Default)]
pub struct InboxQuery {
    pub kind: Option<CaptureKind>,
    pub status: Option<CaptureStatus>,
    pub search: Option<String>,
    pub sort: SortOrder,
}

impl InboxQuery {
    fn matches(&self, capture: &CaptureSummary, needle: Option<&str>) -> bool {
        if self.kind.is_some_and(|kind| kind != capture.kind) {
            return false;
        }
        if self.status.is_some_and(|status| status != capture.status) {
            return false;
        }

        match needle {
            None => true,
            Some(needle) => [&capture.title, &capture.summary, &capture.category]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(needle)),
        }
    }

    /// Matching captures in the requested order; the input is left untouched
    pub fn apply(&self, captures: &[CaptureSummary]) -> Vec<CaptureSummary> {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut selected: Vec<CaptureSummary> = captures
            .iter()
            .filter(|capture| self.matches(capture, needle.as_deref()))
            .cloned()
            .collect();

        match self.sort {
            SortOrder::NewestFirst => selected.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::OldestFirst => selected.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }

        selected
    }
}
