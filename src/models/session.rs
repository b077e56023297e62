/// The viewer on whose behalf votes are cast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub token: Option<String>,
}

impl Session {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
