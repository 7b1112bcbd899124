#[derive(Clone)]
pub enum Message {
    /// Text returned by the narration service.
    Narration(String),
    /// Round markers, rejections, service failures.
    System(String),
}
