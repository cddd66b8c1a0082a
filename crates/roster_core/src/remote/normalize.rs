//! Ingress normalization of remote records.
//!
//! # Responsibility
//! - Map the ad hoc field-name variants returned by the remote service to
//!   canonical models, using one ordered key list per logical field.
//! - Resolve missing names/roles through the baseline, then placeholders.
//!
//! # Invariants
//! - Precedence is positional: the first key holding a non-blank string or
//!   a number wins. Dotted keys (`manager.id`) walk nested objects.
//! - Normalization is deterministic and side-effect-free apart from
//!   diagnostic logging.
//! - Produced teams satisfy `Team::is_consistent()`.

use crate::baseline::BaselineDataset;
use crate::model::employee::{
    is_personnel_code, normalize_employee_id, Employee, SourceTag, NAME_NOT_INFORMED,
    ROLE_NOT_INFORMED,
};
use crate::model::history::{ChangeType, HistoryEntry};
use crate::model::team::{Team, TeamId};
use chrono::{DateTime, NaiveDateTime};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::HashSet;

pub const EMPLOYEE_ID_KEYS: &[&str] = &["employeeId", "mtrc", "matricula", "id"];
pub const EMPLOYEE_NAME_KEYS: &[&str] = &["name", "nome", "nm_fun", "nm_func"];
pub const EMPLOYEE_ROLE_KEYS: &[&str] = &["role", "cargo", "tx_cmss_fun", "funcao"];

pub const TEAM_ID_KEYS: &[&str] = &["id", "teamId", "id_equipe"];
pub const TEAM_CODE_KEYS: &[&str] = &["code", "teamCode", "sigla", "cd_equipe"];
pub const TEAM_NAME_KEYS: &[&str] = &["name", "nome", "nm_equipe"];
pub const TEAM_MEMBERS_KEYS: &[&str] = &["members", "memberIds", "membros"];

pub const MANAGER_ID_KEYS: &[&str] = &[
    "managerId",
    "mtrc_gestor",
    "manager.employeeId",
    "manager.mtrc",
    "manager.matricula",
    "manager.id",
    "manager",
];
pub const MANAGER_NAME_KEYS: &[&str] = &["managerName", "nm_gestor", "manager.name", "manager.nome"];
pub const MANAGER_ROLE_KEYS: &[&str] = &["managerRole", "manager.role", "manager.cargo"];

pub const HISTORY_TIMESTAMP_KEYS: &[&str] = &["timestamp", "dataHora", "dt_alteracao"];
pub const HISTORY_TYPE_KEYS: &[&str] = &["changeType", "tipo", "tp_alteracao"];
pub const HISTORY_DESCRIPTION_KEYS: &[&str] = &["description", "descricao"];

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// First non-blank text value among `keys`, in order.
pub fn first_text(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| lookup(record, key).and_then(text_value))
}

/// Role fallback chain: remote value, then the baseline entry for the
/// same employee in the team, then `ROLE_NOT_INFORMED`.
pub fn resolve_role(
    remote_role: Option<&str>,
    employee_id: &str,
    baseline_team: Option<&Team>,
) -> String {
    if let Some(role) = remote_role.map(str::trim).filter(|role| !role.is_empty()) {
        return role.to_string();
    }
    baseline_team
        .and_then(|team| team.person(employee_id))
        .filter(|person| person.has_informed_role())
        .map(|person| person.role.clone())
        .unwrap_or_else(|| ROLE_NOT_INFORMED.to_string())
}

/// Name fallback chain, same order as `resolve_role`.
pub fn resolve_name(
    remote_name: Option<&str>,
    employee_id: &str,
    baseline_team: Option<&Team>,
) -> String {
    if let Some(name) = remote_name.map(str::trim).filter(|name| !name.is_empty()) {
        return name.to_string();
    }
    baseline_team
        .and_then(|team| team.person(employee_id))
        .filter(|person| person.name != NAME_NOT_INFORMED)
        .map(|person| person.name.clone())
        .unwrap_or_else(|| NAME_NOT_INFORMED.to_string())
}

/// Normalizes one member record. Accepts an object or a bare id.
///
/// Returns `None` when no id can be found.
pub fn normalize_member(record: &Value, baseline_team: Option<&Team>) -> Option<Employee> {
    let (id, name, role) = match record {
        Value::Object(fields) => (
            first_text(fields, EMPLOYEE_ID_KEYS)?,
            first_text(fields, EMPLOYEE_NAME_KEYS),
            first_text(fields, EMPLOYEE_ROLE_KEYS),
        ),
        other => (text_value(other)?, None, None),
    };

    let id = normalize_employee_id(&id);
    if !is_personnel_code(&id) {
        debug!("event=normalize_member module=remote status=unusual_id employee_id={id}");
    }
    let name = resolve_name(name.as_deref(), &id, baseline_team);
    let role = resolve_role(role.as_deref(), &id, baseline_team);
    Some(Employee::new(id, name, role, SourceTag::Remote))
}

/// Normalizes a member list, dropping id-less records and repeated ids
/// (first occurrence wins).
pub fn normalize_members(records: &[Value], baseline_team: Option<&Team>) -> Vec<Employee> {
    let mut seen = HashSet::new();
    let mut members = Vec::with_capacity(records.len());
    let mut dropped = 0usize;
    for record in records {
        match normalize_member(record, baseline_team) {
            Some(member) if seen.insert(member.id.clone()) => members.push(member),
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!(
            "event=normalize_members module=remote status=degraded received={} dropped={dropped}",
            records.len()
        );
    }
    members
}

/// Normalizes one team record from the list-teams call.
///
/// `position` is used as id when neither the record nor the baseline has
/// one. Returns `None` when the team has no code or no resolvable manager.
pub fn normalize_team(
    record: &Value,
    position: usize,
    baseline: &BaselineDataset,
) -> Option<Team> {
    let Some(fields) = record.as_object() else {
        warn!("event=normalize_team module=remote status=skipped reason=not_an_object");
        return None;
    };
    let Some(code) = first_text(fields, TEAM_CODE_KEYS).map(|code| code.to_ascii_uppercase())
    else {
        warn!("event=normalize_team module=remote status=skipped reason=missing_code");
        return None;
    };
    let baseline_team = baseline.team(&code);

    let id = first_text(fields, TEAM_ID_KEYS)
        .and_then(|value| value.parse::<TeamId>().ok())
        .or_else(|| baseline_team.map(|team| team.id))
        .unwrap_or(position as TeamId + 1);
    let name = first_text(fields, TEAM_NAME_KEYS)
        .or_else(|| baseline_team.map(|team| team.name.clone()))
        .unwrap_or_else(|| code.clone());

    let manager_id = first_text(fields, MANAGER_ID_KEYS)
        .or_else(|| baseline_team.map(|team| team.manager.id.clone()));
    let Some(manager_id) = manager_id.map(|id| normalize_employee_id(&id)) else {
        warn!("event=normalize_team module=remote status=skipped reason=missing_manager team={code}");
        return None;
    };
    let manager = Employee::new(
        &manager_id,
        resolve_name(
            first_text(fields, MANAGER_NAME_KEYS).as_deref(),
            &manager_id,
            baseline_team,
        ),
        resolve_role(
            first_text(fields, MANAGER_ROLE_KEYS).as_deref(),
            &manager_id,
            baseline_team,
        ),
        SourceTag::Remote,
    );

    let members = TEAM_MEMBERS_KEYS
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_array))
        .map(|records| normalize_members(records, baseline_team))
        .unwrap_or_default();

    let mut team = Team {
        id,
        code,
        name,
        manager,
        members,
    };
    let removed = team.enforce_invariants();
    if removed > 0 {
        warn!(
            "event=normalize_team module=remote status=degraded team={} reason=manager_listed_as_member removed={removed}",
            team.code
        );
    }
    Some(team)
}

/// Normalizes the list-teams payload; repeated team codes keep the first.
pub fn normalize_teams(records: &[Value], baseline: &BaselineDataset) -> Vec<Team> {
    let mut codes = HashSet::new();
    records
        .iter()
        .enumerate()
        .filter_map(|(position, record)| normalize_team(record, position, baseline))
        .filter(|team| codes.insert(team.code.clone()))
        .collect()
}

/// Normalizes one change-log record.
pub fn normalize_history_entry(record: &Value) -> Option<HistoryEntry> {
    let fields = record.as_object()?;
    let timestamp = HISTORY_TIMESTAMP_KEYS
        .iter()
        .find_map(|key| fields.get(*key).filter(|value| !value.is_null()))
        .and_then(parse_timestamp);
    let change_type = first_text(fields, HISTORY_TYPE_KEYS)
        .map(|label| ChangeType::from_label(&label))
        .unwrap_or_else(|| ChangeType::Other(String::new()));
    let description = first_text(fields, HISTORY_DESCRIPTION_KEYS).unwrap_or_default();
    Some(HistoryEntry {
        timestamp,
        change_type,
        description,
    })
}

/// Normalizes the change log, preserving remote order.
pub fn normalize_history(records: &[Value]) -> Vec<HistoryEntry> {
    let entries: Vec<HistoryEntry> = records.iter().filter_map(normalize_history_entry).collect();
    if entries.len() != records.len() {
        warn!(
            "event=normalize_history module=remote status=degraded received={} kept={}",
            records.len(),
            entries.len()
        );
    }
    entries
}

/// Parses RFC 3339 strings, common naive layouts, or epoch milliseconds.
///
/// Offsets are dropped: the wall-clock time the remote reported is kept.
pub fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|datetime| datetime.naive_utc()),
        Value::String(raw) => {
            let raw = raw.trim();
            if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
                return Some(datetime.naive_local());
            }
            NAIVE_TIMESTAMP_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        }
        _ => None,
    }
}

fn lookup<'a>(record: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = record.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        first_text, normalize_history, normalize_member, normalize_team, normalize_teams,
        parse_timestamp, resolve_role, EMPLOYEE_ID_KEYS,
    };
    use crate::baseline::BaselineDataset;
    use crate::model::employee::{SourceTag, ROLE_NOT_INFORMED};
    use crate::model::history::ChangeType;
    use serde_json::json;

    #[test]
    fn id_precedence_follows_key_order() {
        let record = json!({ "matricula": "F1111111", "mtrc": "F2222222", "id": 99 });
        let fields = record.as_object().expect("object");
        assert_eq!(
            first_text(fields, EMPLOYEE_ID_KEYS).as_deref(),
            Some("F2222222")
        );

        let blank_first = json!({ "employeeId": "  ", "id": 12345 });
        let fields = blank_first.as_object().expect("object");
        assert_eq!(first_text(fields, EMPLOYEE_ID_KEYS).as_deref(), Some("12345"));
    }

    #[test]
    fn member_role_uses_legacy_field_variants() {
        let member = normalize_member(
            &json!({ "mtrc": "f9999999", "nome": "Someone", "tx_cmss_fun": "ANALISTA C UE" }),
            None,
        )
        .expect("member should normalize");
        assert_eq!(member.id, "F9999999");
        assert_eq!(member.name, "Someone");
        assert_eq!(member.role, "ANALISTA C UE");
        assert_eq!(member.source_tag, SourceTag::Remote);
    }

    #[test]
    fn role_chain_prefers_remote_then_baseline_then_placeholder() {
        let baseline = BaselineDataset::bundled();
        let gecoc = baseline.team("GECOC");

        assert_eq!(resolve_role(Some("DIRETOR"), "F7023257", gecoc), "DIRETOR");
        assert_eq!(resolve_role(Some("  "), "F7023257", gecoc), "ASSESSOR II UE");
        assert_eq!(resolve_role(None, "F0000001", gecoc), ROLE_NOT_INFORMED);
        assert_eq!(resolve_role(None, "F7023257", None), ROLE_NOT_INFORMED);
    }

    #[test]
    fn bare_member_ids_resolve_through_baseline() {
        let baseline = BaselineDataset::bundled();
        let team = normalize_team(
            &json!({
                "sigla": "gecoc",
                "mtrc_gestor": "F5012345",
                "membros": ["F7023257", "F0000002"]
            }),
            0,
            baseline,
        )
        .expect("team should normalize");

        assert_eq!(team.code, "GECOC");
        assert_eq!(team.id, 1);
        assert_eq!(team.manager.name, "Mariana Souza Lima");
        assert_eq!(team.members[0].name, "Carlos Eduardo Pereira");
        assert_eq!(team.members[0].role, "ASSESSOR II UE");
        assert_eq!(team.members[1].role, ROLE_NOT_INFORMED);
    }

    #[test]
    fn manager_is_dropped_from_member_list() {
        let baseline = BaselineDataset::bundled();
        let teams = normalize_teams(
            &[json!({
                "code": "XPTO",
                "name": "Unknown team",
                "manager": { "id": "F1234567", "name": "Boss" },
                "members": [
                    { "employeeId": "F1234567", "name": "Boss" },
                    { "employeeId": "F7654321", "name": "Worker", "role": "ANALISTA" }
                ]
            })],
            baseline,
        );

        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].manager.id, "F1234567");
        assert_eq!(teams[0].member_ids(), vec!["F7654321"]);
        assert!(teams[0].is_consistent());
    }

    #[test]
    fn team_without_code_or_manager_is_skipped() {
        let baseline = BaselineDataset::bundled();
        assert!(normalize_team(&json!({ "name": "no code" }), 0, baseline).is_none());
        assert!(normalize_team(&json!({ "code": "NEW" }), 0, baseline).is_none());
    }

    #[test]
    fn history_keeps_order_and_parses_timestamp_variants() {
        let entries = normalize_history(&[
            json!({ "dataHora": "2024-03-05 14:07:00", "tipo": "INCLUSAO", "descricao": "a" }),
            json!({ "timestamp": "2024-03-04T09:30:00-03:00", "changeType": "REMOVE" }),
            json!({ "timestamp": 0, "changeType": "RENAME", "description": "c" }),
        ]);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].change_type, ChangeType::Added);
        assert_eq!(
            entries[0].timestamp.map(|ts| ts.to_string()).as_deref(),
            Some("2024-03-05 14:07:00")
        );
        assert_eq!(
            entries[1].timestamp.map(|ts| ts.to_string()).as_deref(),
            Some("2024-03-04 09:30:00")
        );
        assert_eq!(entries[2].change_type, ChangeType::Other("RENAME".to_string()));
        assert_eq!(
            entries[2].timestamp.map(|ts| ts.to_string()).as_deref(),
            Some("1970-01-01 00:00:00")
        );
    }

    #[test]
    fn unparseable_timestamp_becomes_none() {
        assert!(parse_timestamp(&json!("yesterday")).is_none());
        assert!(parse_timestamp(&json!(true)).is_none());
    }
}
