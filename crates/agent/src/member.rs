//! Caller lookup by phone number, plus the demo callers.

use crate::types::MemberContext;
use assist_core::config::PlatformConfig;
use assist_core::AppResult;
use assist_platform::{Binding, PlatformClient};

/// Shown when the phone number does not match a member.
pub const NO_MEMBER_FOUND: &str = "No data found for the selected phone number.";

/// Member lookup statement. The caller intent gets the grievance type
/// appended for active grievances, and some grievance types carry a
/// retrieval hint.
pub fn member_lookup_sql(platform: &PlatformConfig) -> String {
    format!(
        "SELECT MEMBER_ID, NAME, \
         CASE WHEN POTENTIAL_CALLER_INTENT = 'Active Grievance' \
         THEN POTENTIAL_CALLER_INTENT || ':' || GRIEVANCE_TYPE \
         ELSE POTENTIAL_CALLER_INTENT END AS POTENTIAL_CALLER_INTENT, \
         CASE WHEN POTENTIAL_CALLER_INTENT = 'Active Grievance' \
         AND GRIEVANCE_TYPE = 'Inadequate Care' \
         THEN ' Retrieve related provider details as well' \
         WHEN POTENTIAL_CALLER_INTENT = 'Active Grievance' \
         AND GRIEVANCE_TYPE = 'Delay in claim processing' \
         THEN ' Retrieve related Claim details as well' \
         ELSE '' END AS ADDITIONAL_INFO \
         FROM {}.{}.{} WHERE MEMBER_PHONE = ? LIMIT 1",
        platform.database, platform.schema, platform.member_table
    )
}

/// Look up the member calling from `phone`.
pub async fn lookup_member(
    client: &PlatformClient,
    platform: &PlatformConfig,
    phone: &str,
) -> AppResult<Option<MemberContext>> {
    let phone = phone.trim();
    let rows = client
        .execute(&member_lookup_sql(platform), &[Binding::text(phone)])
        .await?;

    if rows.is_empty() {
        tracing::info!("No member found for {}", phone);
        return Ok(None);
    }

    let field = |column: &str| rows.value(0, column).unwrap_or_default().trim().to_string();
    let member = MemberContext {
        phone: phone.to_string(),
        member_id: field("MEMBER_ID"),
        name: field("NAME"),
        caller_intent: field("POTENTIAL_CALLER_INTENT"),
        // Leading space is part of the hint.
        additional_info: rows.value(0, "ADDITIONAL_INFO").unwrap_or_default().to_string(),
    };

    if member.member_id.is_empty() || member.name.is_empty() {
        tracing::warn!("Member row for {} is missing an ID or name", phone);
        return Ok(None);
    }

    tracing::info!("Selected member {} for {}", member.member_id, phone);
    Ok(Some(member))
}

/// Phone numbers of the demo callers.
pub const SAMPLE_PHONE_NUMBERS: &[&str] = &["946-081-0513", "946-081-0564", "946-081-0696"];

/// Suggested questions for a demo caller.
pub fn sample_questions(phone: &str) -> &'static [&'static str] {
    match phone.trim() {
        "946-081-0564" => &[
            "I see the member has an active grievance related to Inadequate Care. Who is the provider associated with this grievance?",
            "What is the total number of active grievances for Inadequate Care associated with this provider. Include all members and not just the member in context.",
            "How does this compare against the average active grievances for Inadequate Care per provider for all members?",
        ],
        "946-081-0696" => &[
            "Has the member made any calls related to a delay in claim processing? If so, share a summary of this call.",
            "Share all information on this claim.",
        ],
        "946-081-0513" => &[
            "How can the member find out more details about the wellness programs offered?",
            "Member wants to know how to find the member forms online?",
            "What is the plan and coverage information of this member?",
            "Give me the member information on Jessica Mills",
        ],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_lookup_sql_is_parameterized() {
        let sql = member_lookup_sql(&PlatformConfig::default());
        assert!(sql.contains(
            "FROM CALL_CENTER.PUBLIC.CALL_CENTER_MEMBER_DENORMALIZED_WITH_INTENT WHERE MEMBER_PHONE = ?"
        ));
        assert!(sql.contains("POTENTIAL_CALLER_INTENT || ':' || GRIEVANCE_TYPE"));
        assert!(sql.contains("' Retrieve related Claim details as well'"));
    }

    #[test]
    fn test_retrieval_hints_follow_grievance_type() {
        let sql = member_lookup_sql(&PlatformConfig::default());
        assert!(sql.contains(
            "WHEN POTENTIAL_CALLER_INTENT = 'Active Grievance' AND GRIEVANCE_TYPE = 'Inadequate Care' \
             THEN ' Retrieve related provider details as well'"
        ));
        assert!(sql.contains(
            "WHEN POTENTIAL_CALLER_INTENT = 'Active Grievance' AND GRIEVANCE_TYPE = 'Delay in claim processing' \
             THEN ' Retrieve related Claim details as well'"
        ));
        assert!(!sql.contains("WHEN POTENTIAL_CALLER_INTENT = 'Inadequate Care'"));
    }

    #[test]
    fn test_every_sample_phone_has_questions() {
        for phone in SAMPLE_PHONE_NUMBERS {
            assert!(!sample_questions(phone).is_empty(), "{}", phone);
        }
        assert!(sample_questions("000-000-0000").is_empty());
    }
}
