#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("interface record without index (descr `{descr}`)")]
    EmptyIndex { descr: String },
    #[error("invalid physical address `{0}`: expected colon separated hex bytes")]
    InvalidPhysAddress(String),
}

pub type Result<T> = std::result::Result<T, Error>;
