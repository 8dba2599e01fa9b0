use std::error::Error as _;
use thiserror::Error;
use tracing::error;

pub mod http;

#[derive(Debug, Error)]
pub enum MedibotErr {
    #[error("Does not exist; {0}")]
    DoesNotExist(String),

    #[error("Invalid input; {0}")]
    InvalidInput(String),

    #[error("embedding error; {0}")]
    Embedding(String),

    #[error("IO; {0}")]
    IO(#[from] std::io::Error),

    #[error("Parse pdf; {0}")]
    ParsePdf(#[from] lopdf::Error),

    #[error("Regex; {0}")]
    Regex(#[from] regex::Error),

    #[error("Http client; {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Pinecone; {0}")]
    Pinecone(String),

    #[error("Gemini; {0}")]
    Gemini(String),
}

#[derive(Debug, Error)]
#[error("{error}")]
pub struct MedibotError {
    file: &'static str,
    line: u32,
    column: u32,
    pub error: MedibotErr,
}

impl MedibotError {
    pub fn new(file: &'static str, line: u32, column: u32, error: MedibotErr) -> MedibotError {
        MedibotError {
            file,
            line,
            column,
            error,
        }
    }

    pub fn location(&self) -> String {
        format!("{}:{}:{}", self.file, self.line, self.column)
    }

    pub fn print(&self) {
        let location = self.location();

        error!("{location} | {self}");

        if self.error.source().is_some() {
            error!("Causes:");
        }

        let mut src = self.error.source();
        while let Some(source) = src {
            error!(" - {source}");
            src = source.source();
        }
    }
}

#[macro_export]
macro_rules! err {
    ($ty:ident $(, $l:literal $(,)? $($args:expr),* )?) => {
        Err($crate::error::MedibotError::new(
            file!(),
            line!(),
            column!(),
            $crate::error::MedibotErr::$ty $( (format!($l, $( $args, )*)) )?,
        ))
    };
}

#[macro_export]
macro_rules! map_err {
    ($ex:expr) => {
        $ex.map_err(|e| $crate::error::MedibotError::new(file!(), line!(), column!(), e.into()))?
    };
}
