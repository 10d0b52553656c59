/// A nearest-neighbor match returned by the store.
///
/// `distance` is the raw cosine distance reported by the vector index;
/// similarity conversion is the retriever's concern.
#[derive(Debug, Clone)]
pub struct DocumentMatch {
    pub title: String,
    pub content: String,
    pub url: String,
    pub domain: String,
    pub distance: f64,
}
