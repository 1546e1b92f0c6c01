use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Network failure or non-success HTTP status while talking to the API.
    #[error("Connection Error: {0}")]
    ConnectionError(#[from] reqwest::Error),

    /// The API answered with an error object instead of a response.
    #[error("API error {code}: {message}")]
    Remote { code: i64, message: String },

    /// Neither a response nor an error object was found in the reply.
    #[error("API returned an invalid response")]
    InvalidServerResponse,

    #[error("Error while deserializing JSON: {0}")]
    JsonSerializeFail(#[from] serde_json::Error),
}
