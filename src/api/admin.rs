/// Registration and admin aggregate handlers

use serde::{Deserialize, Serialize};

use crate::domain::{User, UserId};
use crate::storage::{ActiveUser, CompletionStore, HabitRegistry, UserStore};
use crate::ServiceError;

/// How many users the admin overview lists
const MOST_ACTIVE_LIMIT: u32 = 5;

/// Parameters for registering a user
#[derive(Debug, Deserialize)]
pub struct RegisterUserParams {
    pub username: String,
    pub email: String,
}

/// System-wide aggregates for the admin view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminOverview {
    pub total_users: u64,
    pub total_habits: u64,
    pub total_completions: u64,
    pub most_active: Vec<ActiveUser>,
}

/// Register a new user
///
/// The account and its zeroed points ledger are created in one
/// transaction, so a registered user always has a ledger to increment.
pub fn register_user<S: UserStore>(
    store: &S,
    params: RegisterUserParams,
) -> Result<User, ServiceError> {
    User::validate_username(&params.username)?;
    User::validate_email(&params.email)?;

    let user = store.create_user(&params.username, &params.email)?;
    tracing::info!("Registered user '{}' with id {}", user.username, user.id);
    Ok(user)
}

/// Look up a user by id
pub fn get_user<S: UserStore>(store: &S, user_id: UserId) -> Result<User, ServiceError> {
    store
        .get_user(user_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))
}

/// All registered accounts, newest first
pub fn list_users<S: UserStore>(store: &S) -> Result<Vec<User>, ServiceError> {
    Ok(store.list_users()?)
}

/// Delete a user account
///
/// Their habits, completion events, ledger and badges cascade away in
/// the same statement.
pub fn delete_user<S: UserStore>(store: &S, user_id: UserId) -> Result<(), ServiceError> {
    store.delete_user(user_id)?;
    tracing::info!("Admin removed user {}", user_id);
    Ok(())
}

/// System-wide counts and the most active users by points
pub fn admin_overview<S>(store: &S) -> Result<AdminOverview, ServiceError>
where
    S: UserStore + HabitRegistry + CompletionStore,
{
    Ok(AdminOverview {
        total_users: store.user_count()?,
        total_habits: store.total_habit_count()?,
        total_completions: store.total_completion_count()?,
        most_active: store.most_active_users(MOST_ACTIVE_LIMIT)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LedgerStore, SqliteStorage};

    fn params(username: &str, email: &str) -> RegisterUserParams {
        RegisterUserParams {
            username: username.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_register_bootstraps_ledger() {
        let storage = SqliteStorage::in_memory().unwrap();
        let user = register_user(&storage, params("alice", "alice@example.com")).unwrap();

        let ledger = storage.ledger(user.id).unwrap();
        assert_eq!(ledger.total_points, 0);
        assert_eq!(ledger.level, 1);
    }

    #[test]
    fn test_register_rejects_bad_input() {
        let storage = SqliteStorage::in_memory().unwrap();

        assert!(matches!(
            register_user(&storage, params("", "a@example.com")),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            register_user(&storage, params("alice", "not-an-email")),
            Err(ServiceError::InvalidInput(_))
        ));
        assert_eq!(storage.user_count().unwrap(), 0);
    }

    #[test]
    fn test_register_duplicate_username_is_conflict() {
        let storage = SqliteStorage::in_memory().unwrap();
        register_user(&storage, params("alice", "alice@example.com")).unwrap();

        let result = register_user(&storage, params("alice", "other@example.com"));
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn test_overview_counts_and_ranking() {
        let storage = SqliteStorage::in_memory().unwrap();
        let alice = register_user(&storage, params("alice", "alice@example.com")).unwrap();
        let bob = register_user(&storage, params("bob", "bob@example.com")).unwrap();

        use crate::domain::{Category, Frequency};
        use chrono::NaiveDate;
        let run = storage
            .create_habit(alice.id, "Run", Category::Sport, Frequency::Daily)
            .unwrap();
        storage
            .insert_completion(run.id, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
            .unwrap();
        storage.add_points(bob.id, 15).unwrap();

        let overview = admin_overview(&storage).unwrap();
        assert_eq!(overview.total_users, 2);
        assert_eq!(overview.total_habits, 1);
        assert_eq!(overview.total_completions, 1);
        assert_eq!(overview.most_active[0].username, "bob");
        assert_eq!(overview.most_active[0].total_points, 15);
        assert_eq!(overview.most_active[0].level, 2);
    }

    #[test]
    fn test_list_and_delete_users() {
        let storage = SqliteStorage::in_memory().unwrap();
        let alice = register_user(&storage, params("alice", "alice@example.com")).unwrap();
        register_user(&storage, params("bob", "bob@example.com")).unwrap();

        assert_eq!(list_users(&storage).unwrap().len(), 2);

        delete_user(&storage, alice.id).unwrap();
        let remaining = list_users(&storage).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].username, "bob");

        assert!(matches!(
            delete_user(&storage, alice.id),
            Err(ServiceError::NotFound(_))
        ));
    }
}
