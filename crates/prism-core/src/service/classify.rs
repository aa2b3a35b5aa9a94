//! Classification of service failures into per-entry generation errors.

use crate::error::{GenerationError, ServiceError};

/// Longest error message surfaced on an entry, in characters.
const MAX_MESSAGE_CHARS: usize = 200;

/// Map a service failure to the error reported on the entry.
///
/// Auth failures: HTTP 401/403. Without a status code (transport errors,
/// SDK-style messages) the text is checked for auth markers instead.
pub fn classify(error: &ServiceError) -> GenerationError {
    let is_auth = match error.status_code {
        Some(code) => code == 401 || code == 403,
        None => mentions_auth(&error.message),
    };
    let message = truncate_message(&error.message);
    if is_auth {
        GenerationError::Auth { message }
    } else {
        GenerationError::Failed { message }
    }
}

/// Whole-word auth markers. URLs are skipped so request ids and paths
/// containing `401` or `403` do not count.
fn mentions_auth(message: &str) -> bool {
    message
        .split_whitespace()
        .filter(|chunk| !chunk.contains("://"))
        .flat_map(|chunk| chunk.split(|c: char| !c.is_alphanumeric()))
        .map(str::to_lowercase)
        .any(|word| is_auth_word(&word))
}

fn is_auth_word(word: &str) -> bool {
    matches!(word, "401" | "403" | "auth")
        || ["authenticat", "authoriz", "unauthori", "credential"]
            .iter()
            .any(|prefix| word.starts_with(prefix))
}

/// Cut a message to at most 200 characters, marking the cut with `…`.
pub fn truncate_message(message: &str) -> String {
    let message = message.trim();
    if message.chars().count() <= MAX_MESSAGE_CHARS {
        return message.to_string();
    }
    let mut truncated: String = message.chars().take(MAX_MESSAGE_CHARS - 1).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_401_status_is_auth() {
        let err = ServiceError::with_status(401, "fal HTTP 401 Unauthorized: bad key");
        assert!(matches!(classify(&err), GenerationError::Auth { .. }));
    }

    #[test]
    fn test_403_status_is_auth() {
        let err = ServiceError::with_status(403, "forbidden");
        assert!(matches!(classify(&err), GenerationError::Auth { .. }));
    }

    #[test]
    fn test_message_with_401_is_auth_without_status() {
        let err = ServiceError::new("Request failed with status 401");
        assert!(matches!(classify(&err), GenerationError::Auth { .. }));
    }

    #[test]
    fn test_message_mentioning_credentials_is_auth() {
        let err = ServiceError::new("Invalid credentials provided");
        assert!(matches!(classify(&err), GenerationError::Auth { .. }));
    }

    #[test]
    fn test_other_messages_are_failures() {
        let err = ServiceError::new("connection refused");
        assert_eq!(
            classify(&err),
            GenerationError::Failed {
                message: "connection refused".into()
            }
        );
    }

    #[test]
    fn test_structured_status_wins_over_text() {
        // Body mentions auth, but the status says it's a server error.
        let err = ServiceError::with_status(500, "auth backend unavailable");
        assert!(matches!(classify(&err), GenerationError::Failed { .. }));
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let long = "x".repeat(1000);
        match classify(&ServiceError::new(long)) {
            GenerationError::Failed { message } => {
                assert_eq!(message.chars().count(), 200);
                assert!(message.ends_with('…'));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_transport_error_with_url_is_failure() {
        let err = ServiceError::new(
            "fal status request failed: error sending request for url \
             (https://queue.fal.run/fal-ai/flux-pro/requests/9f4031c2-4034-4403-a401-27b1c0e8d403/status): \
             connection reset",
        );
        assert!(matches!(classify(&err), GenerationError::Failed { .. }));
    }

    #[test]
    fn test_auth_markers_match_whole_words() {
        for message in [
            "prompt mentions an author",
            "code 4013 returned",
            "authority unavailable",
        ] {
            assert!(
                matches!(classify(&ServiceError::new(message)), GenerationError::Failed { .. }),
                "{message}"
            );
        }
        for message in [
            "Unauthorized",
            "Authentication required",
            "auth: key rejected",
            "HTTP 403 (forbidden)",
        ] {
            assert!(
                matches!(classify(&ServiceError::new(message)), GenerationError::Auth { .. }),
                "{message}"
            );
        }
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let long = "é".repeat(300);
        let truncated = truncate_message(&long);
        assert_eq!(truncated.chars().count(), 200);
    }

    #[test]
    fn test_short_message_untouched() {
        assert_eq!(truncate_message("  oops  "), "oops");
    }
}
