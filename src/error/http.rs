use super::{MedibotErr, MedibotError};
use axum::{http::StatusCode, response::IntoResponse};

impl MedibotError {
    pub fn status(&self) -> StatusCode {
        use MedibotErr as E;
        use StatusCode as SC;
        match self.error {
            E::DoesNotExist(_) => SC::NOT_FOUND,
            E::InvalidInput(_) => SC::UNPROCESSABLE_ENTITY,
            E::IO(_)
            | E::ParsePdf(_)
            | E::Regex(_)
            | E::Embedding(_)
            | E::Reqwest(_)
            | E::Pinecone(_)
            | E::Gemini(_) => SC::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MedibotError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        self.print();

        use MedibotErr as E;

        match self.error {
            E::DoesNotExist(e) | E::InvalidInput(e) => (status, e).into_response(),
            E::IO(_)
            | E::ParsePdf(_)
            | E::Regex(_)
            | E::Embedding(_)
            | E::Reqwest(_)
            | E::Pinecone(_)
            | E::Gemini(_) => (status, "Internal".to_string()).into_response(),
        }
    }
}
