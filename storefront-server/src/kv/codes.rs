//! Verification code store
//!
//! SMS codes keyed by mobile number, with an expiry and a resend
//! cooldown. Codes stay valid until expiry even after a successful
//! check, so a slow client can retry a form submit.

use super::KvResult;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Codes: mobile -> JSON CodeEntry
const SMS_CODES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("sms_codes");

#[derive(Debug, Serialize, Deserialize)]
struct CodeEntry {
    code: String,
    /// unix millis when the code stops verifying
    expires_at: i64,
    /// unix millis before which re-sending is refused
    resend_after: i64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum IssueOutcome {
    Issued,
    /// Still inside the cooldown window of the previous send
    Throttled,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CodeCheck {
    Valid,
    /// Never sent, or past its expiry
    Missing,
    Mismatch,
}

#[derive(Clone)]
pub struct VerifyCodeStore {
    db: Arc<Database>,
}

impl VerifyCodeStore {
    pub fn open(db: Arc<Database>) -> KvResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SMS_CODES_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Store a fresh code unless the previous one is still cooling down
    pub fn issue(
        &self,
        mobile: &str,
        code: &str,
        ttl_secs: i64,
        cooldown_secs: i64,
    ) -> KvResult<IssueOutcome> {
        let now = shared::util::now_millis();
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut table = write_txn.open_table(SMS_CODES_TABLE)?;

            let throttled = match table.get(mobile)? {
                Some(guard) => {
                    let entry: CodeEntry = serde_json::from_slice(guard.value())?;
                    entry.resend_after > now
                }
                None => false,
            };

            if throttled {
                IssueOutcome::Throttled
            } else {
                let entry = CodeEntry {
                    code: code.to_string(),
                    expires_at: now + ttl_secs * 1000,
                    resend_after: now + cooldown_secs * 1000,
                };
                let bytes = serde_json::to_vec(&entry)?;
                table.insert(mobile, bytes.as_slice())?;
                IssueOutcome::Issued
            }
        };
        write_txn.commit()?;
        Ok(outcome)
    }

    /// Compare a submitted code against the stored one
    pub fn check(&self, mobile: &str, code: &str) -> KvResult<CodeCheck> {
        let now = shared::util::now_millis();
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SMS_CODES_TABLE)?;

        let entry: CodeEntry = match table.get(mobile)? {
            Some(guard) => serde_json::from_slice(guard.value())?,
            None => return Ok(CodeCheck::Missing),
        };

        if entry.expires_at <= now {
            return Ok(CodeCheck::Missing);
        }
        if entry.code != code {
            return Ok(CodeCheck::Mismatch);
        }
        Ok(CodeCheck::Valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::open_in_memory;

    #[test]
    fn test_issue_and_check() {
        let codes = VerifyCodeStore::open(open_in_memory().unwrap()).unwrap();

        assert_eq!(
            codes.issue("13612345678", "123456", 300, 60).unwrap(),
            IssueOutcome::Issued
        );
        assert_eq!(codes.check("13612345678", "123456").unwrap(), CodeCheck::Valid);
        assert_eq!(codes.check("13612345678", "654321").unwrap(), CodeCheck::Mismatch);
        assert_eq!(codes.check("13600000000", "123456").unwrap(), CodeCheck::Missing);

        // Codes survive a successful check until expiry
        assert_eq!(codes.check("13612345678", "123456").unwrap(), CodeCheck::Valid);
    }

    #[test]
    fn test_cooldown_throttles_resend() {
        let codes = VerifyCodeStore::open(open_in_memory().unwrap()).unwrap();

        codes.issue("13612345678", "111111", 300, 60).unwrap();
        assert_eq!(
            codes.issue("13612345678", "222222", 300, 60).unwrap(),
            IssueOutcome::Throttled
        );
        // The original code is still the live one
        assert_eq!(codes.check("13612345678", "111111").unwrap(), CodeCheck::Valid);

        // Zero cooldown lets the next send through immediately
        codes.issue("13698765432", "333333", 300, 0).unwrap();
        assert_eq!(
            codes.issue("13698765432", "444444", 300, 0).unwrap(),
            IssueOutcome::Issued
        );
    }

    #[test]
    fn test_expired_code_is_missing() {
        let codes = VerifyCodeStore::open(open_in_memory().unwrap()).unwrap();
        codes.issue("13612345678", "123456", 0, 0).unwrap();
        assert_eq!(codes.check("13612345678", "123456").unwrap(), CodeCheck::Missing);
    }
}
