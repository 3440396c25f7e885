use thiserror::Error;
#[derive(Debug, Error)]
pub enum EcgError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("failed to render figure: {0}")]
    Render(String),
}
impl EcgError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        EcgError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for EcgError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        EcgError::Render(format!("{value:?}"))
    }
}
impl From<image::ImageError> for EcgError {
    fn from(value: image::ImageError) -> Self {
        EcgError::Render(value.to_string())
    }
}
impl From<std::io::Error> for EcgError {
    fn from(value: std::io::Error) -> Self {
        EcgError::Render(value.to_string())
    }
}
