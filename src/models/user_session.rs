use crate::models::auth_user::AuthSession;
use crate::models::chat_message::ChatMessage;

/// Server-side chat-page state for one signed-in browser session.
///
/// `uploaded_files` is what the sidebar displays; `attach_set` is the
/// mutable set of file URLs the next outgoing query will reference. The
/// two start identical after a page load and only the attach set is
/// edited in place. The display set is kept honest by re-fetching.
#[derive(Clone)]
pub struct UserSession {
    pub auth: AuthSession,
    pub chat_data: Vec<ChatMessage>,
    /// `None` marks a failed file-list load.
    pub uploaded_files: Option<Vec<String>>,
    pub attach_set: Option<Vec<String>>,
}

impl UserSession {
    pub fn new(auth: AuthSession) -> Self {
        UserSession {
            auth,
            chat_data: Vec::new(),
            uploaded_files: Some(Vec::new()),
            attach_set: Some(Vec::new()),
        }
    }

    /// Applies the outcome of the file-list fetch on page load. A failed
    /// fetch marks both sets absent; the caller then skips loading the
    /// chat history.
    pub fn apply_file_load(&mut self, files: Option<Vec<String>>) {
        match files {
            Some(list) => {
                self.uploaded_files = Some(list.clone());
                self.attach_set = Some(list);
            }
            None => {
                self.uploaded_files = None;
                self.attach_set = None;
            }
        }
    }

    /// Sidebar edit of the attach set: deletion filters by exact URL
    /// match, addition appends. The display set is not touched here.
    pub fn apply_files_change(&mut self, file: &str, is_deleted: bool) {
        if is_deleted {
            if let Some(set) = self.attach_set.as_mut() {
                set.retain(|existing| existing != file);
            }
        } else {
            self.attach_set
                .get_or_insert_with(Vec::new)
                .push(file.to_string());
        }
    }

    pub fn set_chat_data(&mut self, messages: Vec<ChatMessage>) {
        self.chat_data = messages;
    }

    /// Appends a successfully sent message, preserving everything already
    /// on screen.
    pub fn push_message(&mut self, message: ChatMessage) {
        self.chat_data.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session() -> UserSession {
        UserSession::new(AuthSession {
            uid: "u123".to_string(),
            email: "student@example.com".to_string(),
            display_name: "Student".to_string(),
            email_verified: true,
            id_token: "token".to_string(),
            refresh_token: "refresh".to_string(),
        })
    }

    #[test]
    fn file_load_success_populates_both_sets() {
        let mut session = test_session();
        session.apply_file_load(Some(vec!["a".into(), "b".into()]));
        assert_eq!(session.uploaded_files.as_deref(), Some(["a".to_string(), "b".to_string()].as_slice()));
        assert_eq!(session.uploaded_files, session.attach_set);
    }

    #[test]
    fn file_load_failure_clears_both_sets() {
        let mut session = test_session();
        session.apply_file_load(Some(vec!["a".into()]));
        session.apply_file_load(None);
        assert!(session.uploaded_files.is_none());
        assert!(session.attach_set.is_none());
    }

    #[test]
    fn deletion_removes_only_exact_matches() {
        let mut session = test_session();
        session.apply_file_load(Some(vec!["a".into(), "b".into(), "c".into()]));
        session.apply_files_change("new", false);
        session.apply_files_change("b", true);
        assert_eq!(
            session.attach_set.as_deref(),
            Some(["a".to_string(), "c".to_string(), "new".to_string()].as_slice())
        );
    }

    #[test]
    fn deletion_is_independent_of_unrelated_additions() {
        let mut left = test_session();
        left.apply_file_load(Some(vec!["a".into(), "b".into()]));
        left.apply_files_change("x", false);
        left.apply_files_change("b", true);

        let mut right = test_session();
        right.apply_file_load(Some(vec!["a".into(), "b".into()]));
        right.apply_files_change("b", true);
        right.apply_files_change("x", false);

        assert_eq!(left.attach_set, right.attach_set);
    }

    #[test]
    fn addition_after_failed_load_starts_a_fresh_set() {
        let mut session = test_session();
        session.apply_file_load(None);
        session.apply_files_change("a", false);
        assert_eq!(session.attach_set.as_deref(), Some(["a".to_string()].as_slice()));
        // The display set stays absent until a re-fetch succeeds.
        assert!(session.uploaded_files.is_none());
    }

    #[test]
    fn push_message_preserves_previous_messages() {
        let mut session = test_session();
        let mut first = ChatMessage::default();
        first.heading1 = "First".to_string();
        let mut second = ChatMessage::default();
        second.heading1 = "Second".to_string();
        session.push_message(first.clone());
        session.push_message(second.clone());
        assert_eq!(session.chat_data, vec![first, second]);
    }
}
