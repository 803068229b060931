use std::fmt;

/**
 * Represents the type of error that can occur within the application.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorType {
    /**
     * Startup failure not tied to a data source (configuration, logging, server setup).
     */
    Initialization,
    /**
     * A source could not be fetched or read.
     */
    SourceRetrieval,
    /**
     * A source is missing an expected column or holds a value of the wrong type.
     */
    Schema,
    /**
     * A request refers to a subject, country or year that is not in the merged table.
     */
    Validation,
}

/**
 * Represents an error that occurs within the application.
 */
#[derive(Debug, Clone)]
pub struct ApplicationError {
    /**
     * Error type.
     */
    pub error_type: ErrorType,
    /**
     * Error message describing problem.
     */
    pub message: String,
}

impl ApplicationError {
    /**
     * Creates a new ApplicationError.
     *
     * #Arguments
     * `error_type`: The type of error.
     * `message`: A description of the error.
     */
    pub fn new(error_type: ErrorType, message: String) -> Self {
        ApplicationError { error_type, message }
    }
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<ApplicationError> for std::io::Error {
    fn from(err: ApplicationError) -> Self {
        std::io::Error::other(format!("{:?}: {}", err.error_type, err.message))
    }
}
