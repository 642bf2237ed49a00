// Capability check for mutating operations on owned resources. A resource
// whose creator was deleted (owner is NULL) belongs to nobody.

pub fn is_creator(actor_id: i64, created_by: Option<i64>) -> bool {
    created_by == Some(actor_id)
}
