use crate::domain::repositories::ImageSource;

/// An image held in memory, for buffers already read and for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryImage {
    data: Vec<u8>,
    label: String,
}

impl MemoryImage {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            label: "<memory>".to_string(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl ImageSource for MemoryImage {
    fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn label(&self) -> &str {
        &self.label
    }
}
