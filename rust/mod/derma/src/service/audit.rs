use tracing::{debug, warn};

use dermadetect_core::{locale_timestamp, new_time_id};

use crate::model::{Account, AuditEntry};
use crate::service::{DermaError, DermaService};

const AUDIT_KEY: &str = "derma:audit_log";

impl DermaService {
    /// Prepend an entry to the audit log. Never fails; storage errors are
    /// logged and the entry is dropped.
    pub fn record_audit(&self, action: &str, actor: Option<&Account>, details: &str) {
        let mut log: Vec<AuditEntry> = match self.load_doc(AUDIT_KEY) {
            Ok(log) => log,
            Err(e) => {
                warn!(action, "audit log unreadable, entry dropped: {}", e);
                return;
            }
        };

        let (actor_name, actor_role) = match actor {
            Some(a) => (a.name.clone(), a.role.as_str().to_string()),
            None => ("Unknown".to_string(), "system".to_string()),
        };

        log.insert(
            0,
            AuditEntry {
                id: new_time_id(),
                timestamp: locale_timestamp(),
                action: action.to_string(),
                actor_name,
                actor_role,
                details: details.to_string(),
            },
        );

        if let Err(e) = self.store_doc(AUDIT_KEY, &log) {
            warn!(action, "audit entry not written: {}", e);
            return;
        }
        debug!(action, "audit entry recorded");
    }

    /// The whole audit log, newest first. Only the main admin sees entries;
    /// anyone else gets an empty list.
    pub fn audit_log(&self, requestor: Option<&Account>) -> Result<Vec<AuditEntry>, DermaError> {
        match requestor {
            Some(a) if a.is_main_admin() => self.load_doc(AUDIT_KEY),
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Account, Role};
    use crate::testing::{fixture, registration};

    #[test]
    fn entries_are_prepended() {
        let fx = fixture();
        fx.svc.record_audit("First", None, "one");
        fx.svc.record_audit("Second", None, "two");

        let logs = fx.svc.audit_log(Some(&Account::main_admin())).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].action, "Second");
        assert_eq!(logs[1].action, "First");
        assert!(logs[0].id > logs[1].id);
    }

    #[test]
    fn missing_actor_is_system() {
        let fx = fixture();
        fx.svc.record_audit("Maintenance", None, "ran");
        let logs = fx.svc.audit_log(Some(&Account::main_admin())).unwrap();
        assert_eq!(logs[0].actor_name, "Unknown");
        assert_eq!(logs[0].actor_role, "system");
    }

    #[tokio::test]
    async fn only_main_admin_can_list() {
        let fx = fixture();
        let jane = fx
            .svc
            .create_sub_admin(
                crate::model::NewStaff {
                    name: "Jane".into(),
                    email: "jane@x.com".into(),
                    password: "pw".into(),
                },
                &Account::main_admin(),
            )
            .unwrap();
        let patient = fx
            .svc
            .register(registration("Pat", "pat@x.com", Role::Patient))
            .await
            .unwrap();

        assert!(fx.svc.audit_log(Some(&jane)).unwrap().is_empty());
        assert!(fx.svc.audit_log(Some(&patient)).unwrap().is_empty());
        assert!(fx.svc.audit_log(None).unwrap().is_empty());
        assert_eq!(fx.svc.audit_log(Some(&Account::main_admin())).unwrap().len(), 2);
    }

    #[test]
    fn corrupt_log_is_not_clobbered() {
        let fx = fixture();
        fx.kv.set("derma:audit_log", b"{broken").unwrap();
        fx.svc.record_audit("Lost", None, "dropped");
        assert_eq!(fx.kv.get("derma:audit_log").unwrap().unwrap(), b"{broken");
    }
}
