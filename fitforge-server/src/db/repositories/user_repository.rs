use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use fitforge_types::{ExperienceLevel, FitnessGoal, User, UserStats};

use crate::db::{
    is_unique_violation, optional_timestamp_column, timestamp_column, uuid_column, DbPool,
    Inserted,
};

const USER_COLUMNS: &str = "id, username, email, fitness_goal, experience_level, is_premium,
     premium_since, stripe_customer_id, stripe_subscription_id, join_date";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let goal: String = row.get(3)?;
    let level: String = row.get(4)?;
    Ok(User {
        id: uuid_column(row, 0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        fitness_goal: FitnessGoal::parse(&goal).unwrap_or_default(),
        experience_level: ExperienceLevel::parse(&level).unwrap_or_default(),
        is_premium: row.get::<_, i32>(5)? == 1,
        premium_since: optional_timestamp_column(row, 6)?,
        stripe_customer_id: row.get(7)?,
        stripe_subscription_id: row.get(8)?,
        join_date: timestamp_column(row, 9)?,
    })
}

/// Fields required to register an account
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub fitness_goal: FitnessGoal,
    pub experience_level: ExperienceLevel,
}

/// Result of linking a checkout to an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PremiumGrant {
    Granted,
    UnknownUser,
    /// The customer id already belongs to another account
    CustomerTaken,
}

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new account; a taken username or email yields `Inserted::Duplicate`
    pub fn create(&self, new_user: &NewUser<'_>) -> Result<Inserted<User>> {
        let conn = self.pool.get()?;
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.to_string(),
            email: new_user.email.to_string(),
            fitness_goal: new_user.fitness_goal,
            experience_level: new_user.experience_level,
            is_premium: false,
            premium_since: None,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            join_date: Utc::now(),
        };

        let result = conn.execute(
            "INSERT INTO users (id, username, email, password_hash, fitness_goal, experience_level, join_date)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                user.id.to_string(),
                &user.username,
                &user.email,
                new_user.password_hash,
                user.fitness_goal.as_str(),
                user.experience_level.as_str(),
                user.join_date.to_rfc3339(),
            ),
        );

        match result {
            Ok(_) => Ok(Inserted::Created(user)),
            Err(e) if is_unique_violation(&e) => Ok(Inserted::Duplicate),
            Err(e) => Err(e).context("Failed to create user"),
        }
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: &Uuid) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                [user_id.to_string()],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Get a user together with their password hash, for login
    pub fn get_credentials(&self, username: &str) -> Result<Option<(User, String)>> {
        let conn = self.pool.get()?;
        let found = conn
            .query_row(
                &format!(
                    "SELECT {}, password_hash FROM users WHERE username = ?",
                    USER_COLUMNS
                ),
                [username],
                |row| Ok((user_from_row(row)?, row.get::<_, String>(10)?)),
            )
            .optional()?;
        Ok(found)
    }

    /// Update editable profile fields; `None` leaves a field unchanged
    pub fn update_profile(
        &self,
        user_id: &Uuid,
        email: Option<&str>,
        goal: Option<FitnessGoal>,
        level: Option<ExperienceLevel>,
    ) -> Result<Inserted<()>> {
        let conn = self.pool.get()?;
        let result = conn.execute(
            "UPDATE users SET
                email = COALESCE(?, email),
                fitness_goal = COALESCE(?, fitness_goal),
                experience_level = COALESCE(?, experience_level)
             WHERE id = ?",
            (
                email,
                goal.map(|g| g.as_str()),
                level.map(|l| l.as_str()),
                user_id.to_string(),
            ),
        );

        match result {
            Ok(_) => Ok(Inserted::Created(())),
            Err(e) if is_unique_violation(&e) => Ok(Inserted::Duplicate),
            Err(e) => Err(e).context("Failed to update user profile"),
        }
    }

    /// Grant premium and store the billing identifiers.
    ///
    /// `premium_since` keeps its first value while the user stays premium, so
    /// replaying the same grant does not move it.
    pub fn mark_premium(
        &self,
        user_id: &Uuid,
        customer_id: Option<&str>,
        subscription_id: Option<&str>,
    ) -> Result<PremiumGrant> {
        let conn = self.pool.get()?;
        let result = conn.execute(
            "UPDATE users SET
                premium_since = CASE
                    WHEN is_premium = 1 AND premium_since IS NOT NULL THEN premium_since
                    ELSE ? END,
                is_premium = 1,
                stripe_customer_id = COALESCE(?, stripe_customer_id),
                stripe_subscription_id = COALESCE(?, stripe_subscription_id)
             WHERE id = ?",
            (
                Utc::now().to_rfc3339(),
                customer_id,
                subscription_id,
                user_id.to_string(),
            ),
        );

        match result {
            Ok(0) => Ok(PremiumGrant::UnknownUser),
            Ok(_) => Ok(PremiumGrant::Granted),
            Err(e) if is_unique_violation(&e) => Ok(PremiumGrant::CustomerTaken),
            Err(e) => Err(e).context("Failed to mark user premium"),
        }
    }

    /// Set the entitlement of the user holding `customer_id`.
    /// Returns the affected user, or `None` when nobody holds that customer id.
    pub fn set_premium_by_customer(
        &self,
        customer_id: &str,
        is_premium: bool,
        subscription_id: Option<&str>,
    ) -> Result<Option<Uuid>> {
        let conn = self.pool.get()?;
        let user_id = conn
            .query_row(
                "UPDATE users SET
                    premium_since = CASE
                        WHEN ? = 0 THEN premium_since
                        WHEN is_premium = 1 AND premium_since IS NOT NULL THEN premium_since
                        ELSE ? END,
                    is_premium = ?,
                    stripe_subscription_id = COALESCE(?, stripe_subscription_id)
                 WHERE stripe_customer_id = ?
                 RETURNING id",
                (
                    is_premium as i32,
                    Utc::now().to_rfc3339(),
                    is_premium as i32,
                    subscription_id,
                    customer_id,
                ),
                |row| uuid_column(row, 0),
            )
            .optional()
            .context("Failed to update subscription state")?;
        Ok(user_id)
    }

    /// Revoke premium and clear the subscription id for the holder of `customer_id`
    pub fn cancel_by_customer(&self, customer_id: &str) -> Result<Option<Uuid>> {
        let conn = self.pool.get()?;
        let user_id = conn
            .query_row(
                "UPDATE users SET is_premium = 0, stripe_subscription_id = NULL
                 WHERE stripe_customer_id = ?
                 RETURNING id",
                [customer_id],
                |row| uuid_column(row, 0),
            )
            .optional()
            .context("Failed to cancel subscription")?;
        Ok(user_id)
    }

    /// Aggregate training and social totals for a profile page
    pub fn stats(&self, user_id: &Uuid) -> Result<UserStats> {
        let conn = self.pool.get()?;
        let id = user_id.to_string();
        let stats = conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM workout_logs WHERE user_id = ?1),
                (SELECT COUNT(*) FROM workout_completions WHERE user_id = ?1),
                (SELECT COALESCE(SUM(calories), 0) FROM workout_logs WHERE user_id = ?1),
                (SELECT COALESCE(SUM(duration), 0) FROM workout_logs WHERE user_id = ?1),
                (SELECT COUNT(*) FROM follows WHERE following_id = ?1),
                (SELECT COUNT(*) FROM follows WHERE follower_id = ?1)",
            [id],
            |row| {
                Ok(UserStats {
                    workout_logs: row.get(0)?,
                    completions: row.get(1)?,
                    total_calories: row.get::<_, i64>(2)? as u64,
                    total_minutes: row.get::<_, i64>(3)? as u64,
                    followers: row.get(4)?,
                    following: row.get(5)?,
                })
            },
        )?;
        Ok(stats)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::Database;

    pub(crate) fn create_user(repo: &UserRepository, username: &str) -> User {
        let email = format!("{}@example.com", username);
        match repo
            .create(&NewUser {
                username,
                email: &email,
                password_hash: "hash",
                fitness_goal: FitnessGoal::GeneralFitness,
                experience_level: ExperienceLevel::Beginner,
            })
            .expect("Failed to create user")
        {
            Inserted::Created(user) => user,
            Inserted::Duplicate => panic!("user {} already exists", username),
        }
    }

    fn setup() -> UserRepository {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        UserRepository::new(db.pool.clone())
    }

    #[test]
    fn test_create_and_get_user() {
        let repo = setup();
        let user = create_user(&repo, "alice");

        let loaded = repo.get_by_id(&user.id).unwrap().expect("user exists");
        assert_eq!(loaded.username, "alice");
        assert_eq!(loaded.email, "alice@example.com");
        assert!(!loaded.is_premium);
        assert!(loaded.premium_since.is_none());
    }

    #[test]
    fn test_duplicate_username_is_reported() {
        let repo = setup();
        create_user(&repo, "alice");

        let result = repo
            .create(&NewUser {
                username: "alice",
                email: "other@example.com",
                password_hash: "hash",
                fitness_goal: FitnessGoal::LoseFat,
                experience_level: ExperienceLevel::Advanced,
            })
            .unwrap();
        assert!(matches!(result, Inserted::Duplicate));
    }

    #[test]
    fn test_credentials_include_hash() {
        let repo = setup();
        create_user(&repo, "bob");

        let (user, hash) = repo.get_credentials("bob").unwrap().expect("found");
        assert_eq!(user.username, "bob");
        assert_eq!(hash, "hash");
        assert!(repo.get_credentials("nobody").unwrap().is_none());
    }

    #[test]
    fn test_mark_premium_keeps_first_timestamp() {
        let repo = setup();
        let user = create_user(&repo, "carol");

        assert_eq!(
            repo.mark_premium(&user.id, Some("cus_1"), Some("sub_1")).unwrap(),
            PremiumGrant::Granted
        );
        let first = repo.get_by_id(&user.id).unwrap().unwrap();

        assert_eq!(
            repo.mark_premium(&user.id, Some("cus_1"), Some("sub_1")).unwrap(),
            PremiumGrant::Granted
        );
        let second = repo.get_by_id(&user.id).unwrap().unwrap();

        assert!(second.is_premium);
        assert_eq!(first.premium_since, second.premium_since);
        assert_eq!(second.stripe_customer_id.as_deref(), Some("cus_1"));
        assert_eq!(second.stripe_subscription_id.as_deref(), Some("sub_1"));
    }

    #[test]
    fn test_mark_premium_unknown_user() {
        let repo = setup();
        assert_eq!(
            repo.mark_premium(&Uuid::new_v4(), None, None).unwrap(),
            PremiumGrant::UnknownUser
        );
    }

    #[test]
    fn test_customer_id_links_one_account() {
        let repo = setup();
        let first = create_user(&repo, "frank");
        let second = create_user(&repo, "grace");

        repo.mark_premium(&first.id, Some("cus_shared"), Some("sub_1")).unwrap();
        assert_eq!(
            repo.mark_premium(&second.id, Some("cus_shared"), Some("sub_2")).unwrap(),
            PremiumGrant::CustomerTaken
        );

        let loaded = repo.get_by_id(&second.id).unwrap().unwrap();
        assert!(!loaded.is_premium);
        assert!(loaded.stripe_customer_id.is_none());

        // Accounts without a customer id never collide
        assert_eq!(
            repo.mark_premium(&second.id, None, None).unwrap(),
            PremiumGrant::Granted
        );
        assert_eq!(
            repo.set_premium_by_customer("cus_shared", false, None).unwrap(),
            Some(first.id)
        );
    }

    #[test]
    fn test_customer_scoped_updates() {
        let repo = setup();
        let user = create_user(&repo, "dave");
        repo.mark_premium(&user.id, Some("cus_9"), Some("sub_9")).unwrap();

        let affected = repo.set_premium_by_customer("cus_9", false, Some("sub_10")).unwrap();
        assert_eq!(affected, Some(user.id));
        let loaded = repo.get_by_id(&user.id).unwrap().unwrap();
        assert!(!loaded.is_premium);
        assert_eq!(loaded.stripe_subscription_id.as_deref(), Some("sub_10"));

        let affected = repo.cancel_by_customer("cus_9").unwrap();
        assert_eq!(affected, Some(user.id));
        let loaded = repo.get_by_id(&user.id).unwrap().unwrap();
        assert!(loaded.stripe_subscription_id.is_none());

        assert!(repo.cancel_by_customer("cus_missing").unwrap().is_none());
    }

    #[test]
    fn test_update_profile_partial() {
        let repo = setup();
        let user = create_user(&repo, "erin");

        repo.update_profile(&user.id, None, Some(FitnessGoal::BuildMuscle), None)
            .unwrap();
        let loaded = repo.get_by_id(&user.id).unwrap().unwrap();
        assert_eq!(loaded.fitness_goal, FitnessGoal::BuildMuscle);
        assert_eq!(loaded.experience_level, ExperienceLevel::Beginner);
        assert_eq!(loaded.email, "erin@example.com");
    }
}
