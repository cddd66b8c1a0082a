#![allow(dead_code)]

use roster_core::{AdditionRequest, RemoteError, RemoteOperation, RemoteResult, RemovalRequest, RosterRemote};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

/// In-memory remote with scriptable failures and a call journal.
///
/// Successful add/remove calls mutate the scripted member lists, so a
/// refresh after a commit observes them.
#[derive(Default)]
pub struct ScriptedRemote {
    teams: Vec<Value>,
    members: RefCell<BTreeMap<String, Vec<Value>>>,
    history: Vec<Value>,
    calls: RefCell<Vec<String>>,
    fail_list_teams: bool,
    fail_list_members: bool,
    fail_ids: HashSet<String>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remote that fails every call.
    pub fn unreachable() -> Self {
        Self::new().failing_list_teams().failing_list_members()
    }

    pub fn with_teams(mut self, teams: Vec<Value>) -> Self {
        self.teams = teams;
        self
    }

    /// Member records returned by `list_members(team_code)`; roles are omitted
    /// the way the real endpoint omits them.
    pub fn with_member_ids(self, team_code: &str, ids: &[&str]) -> Self {
        let records = ids.iter().map(|id| json!({ "mtrc": id })).collect();
        self.members.borrow_mut().insert(team_code.to_string(), records);
        self
    }

    pub fn with_history(mut self, history: Vec<Value>) -> Self {
        self.history = history;
        self
    }

    pub fn failing_list_teams(mut self) -> Self {
        self.fail_list_teams = true;
        self
    }

    pub fn failing_list_members(mut self) -> Self {
        self.fail_list_members = true;
        self
    }

    /// Add/remove calls for `employee_id` fail with a server error.
    pub fn failing_for(mut self, employee_id: &str) -> Self {
        self.fail_ids.insert(employee_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn write_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with("add ") || call.starts_with("remove "))
            .collect()
    }

    pub fn member_ids(&self, team_code: &str) -> Vec<String> {
        self.members
            .borrow()
            .get(team_code)
            .map(|records| {
                records
                    .iter()
                    .filter_map(|record| record["mtrc"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl RosterRemote for ScriptedRemote {
    fn list_teams(&self) -> RemoteResult<Vec<Value>> {
        self.record("list_teams".to_string());
        if self.fail_list_teams {
            return Err(RemoteError::network(
                RemoteOperation::ListTeams,
                "connection refused",
            ));
        }
        Ok(self.teams.clone())
    }

    fn list_members(&self, team_code: &str) -> RemoteResult<Vec<Value>> {
        self.record(format!("list_members {team_code}"));
        if self.fail_list_members {
            return Err(RemoteError::network(
                RemoteOperation::ListMembers,
                "connection reset",
            ));
        }
        Ok(self
            .members
            .borrow()
            .get(team_code)
            .cloned()
            .unwrap_or_default())
    }

    fn add_employee(&self, team_code: &str, request: &AdditionRequest) -> RemoteResult<()> {
        self.record(format!("add {team_code} {}", request.employee_id));
        if self.fail_ids.contains(&request.employee_id) {
            return Err(RemoteError::status(
                RemoteOperation::AddEmployee,
                500,
                "rejected by server",
            ));
        }
        self.members
            .borrow_mut()
            .entry(team_code.to_string())
            .or_default()
            .push(json!({ "mtrc": request.employee_id, "nome": request.name }));
        Ok(())
    }

    fn remove_employee(&self, team_code: &str, request: &RemovalRequest) -> RemoteResult<()> {
        self.record(format!("remove {team_code} {}", request.employee_id));
        if self.fail_ids.contains(&request.employee_id) {
            return Err(RemoteError::status(
                RemoteOperation::RemoveEmployee,
                500,
                "rejected by server",
            ));
        }
        if let Some(records) = self.members.borrow_mut().get_mut(team_code) {
            records.retain(|record| record["mtrc"].as_str() != Some(request.employee_id.as_str()));
        }
        Ok(())
    }

    fn change_history(&self) -> RemoteResult<Vec<Value>> {
        self.record("change_history".to_string());
        if self.fail_list_teams {
            return Err(RemoteError::network(
                RemoteOperation::ChangeHistory,
                "connection refused",
            ));
        }
        Ok(self.history.clone())
    }
}

/// Remote team records for the bundled GECOC team, using legacy field names.
pub fn gecoc_remote_team() -> Value {
    json!({
        "id_equipe": 1,
        "sigla": "GECOC",
        "nm_equipe": "Gerência de Validação de Modelos de Crédito",
        "mtrc_gestor": "F5012345",
        "membros": [
            { "mtrc": "F7023257", "nome": "Carlos Eduardo Pereira" },
            { "matricula": "f6034418", "nm_fun": "Ana Paula Ribeiro", "cargo": "ASSESSOR I UE" },
            { "employeeId": "F8045529", "name": "Rafael Gomes Nunes", "role": "ASSESSOR II UE" },
            { "id": "F4056630", "nome": "Juliana Martins Rocha", "tx_cmss_fun": "ANALISTA A UE" }
        ]
    })
}

/// Remote team record for GEMOD.
pub fn gemod_remote_team() -> Value {
    json!({
        "code": "GEMOD",
        "managerId": "F3067741",
        "members": ["F2078852", "F9089963", "F1090074"]
    })
}
