/// SQL schema for the Fitforge database
/// Creates all tables with proper constraints, foreign keys, and indexes
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT UNIQUE NOT NULL,
    email TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    fitness_goal TEXT NOT NULL DEFAULT 'general_fitness'
        CHECK(fitness_goal IN ('build_muscle', 'lose_fat', 'increase_strength', 'general_fitness')),
    experience_level TEXT NOT NULL DEFAULT 'beginner'
        CHECK(experience_level IN ('beginner', 'intermediate', 'advanced')),
    is_premium INTEGER NOT NULL DEFAULT 0,
    premium_since TEXT,
    stripe_customer_id TEXT,
    stripe_subscription_id TEXT,
    join_date TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_users_stripe_customer_unique ON users(stripe_customer_id);

-- Sessions table for bearer authentication
CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);

-- Workout plans
CREATE TABLE IF NOT EXISTS workout_plans (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    goal TEXT NOT NULL,
    level TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_workout_plans_user ON workout_plans(user_id, created_at DESC);

CREATE TABLE IF NOT EXISTS workout_routines (
    id TEXT PRIMARY KEY,
    plan_id TEXT NOT NULL,
    day TEXT NOT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (plan_id) REFERENCES workout_plans(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_workout_routines_plan ON workout_routines(plan_id, sort_order);

CREATE TABLE IF NOT EXISTS workout_exercises (
    id TEXT PRIMARY KEY,
    routine_id TEXT NOT NULL,
    name TEXT NOT NULL,
    sets INTEGER NOT NULL CHECK(sets > 0),
    reps TEXT NOT NULL,
    weight REAL,
    notes TEXT NOT NULL DEFAULT '',
    sort_order INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (routine_id) REFERENCES workout_routines(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_workout_exercises_routine ON workout_exercises(routine_id, sort_order);

-- Exercise catalog
CREATE TABLE IF NOT EXISTS exercises (
    id TEXT PRIMARY KEY,
    name TEXT UNIQUE NOT NULL,
    muscle_group TEXT NOT NULL,
    difficulty TEXT NOT NULL,
    equipment TEXT NOT NULL,
    video_url TEXT
);

CREATE INDEX IF NOT EXISTS idx_exercises_muscle_group ON exercises(muscle_group);

-- Workout logs
CREATE TABLE IF NOT EXISTS workout_logs (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    exercise TEXT NOT NULL,
    sets INTEGER NOT NULL,
    reps INTEGER NOT NULL,
    weight REAL,
    calories INTEGER NOT NULL DEFAULT 0,
    duration INTEGER NOT NULL DEFAULT 0,
    date TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_workout_logs_user ON workout_logs(user_id, created_at DESC);

-- Routine completions, at most one per user, routine and day
CREATE TABLE IF NOT EXISTS workout_completions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    routine_id TEXT NOT NULL,
    date TEXT NOT NULL,
    UNIQUE (user_id, routine_id, date),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

-- Activity records (append-only)
CREATE TABLE IF NOT EXISTS activities (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    action TEXT NOT NULL,
    time TEXT NOT NULL,
    routine_id TEXT,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_activities_time ON activities(time DESC);

-- Follows table (one-way relationships)
CREATE TABLE IF NOT EXISTS follows (
    follower_id TEXT NOT NULL,
    following_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (follower_id, following_id),
    CHECK (follower_id <> following_id),
    FOREIGN KEY (follower_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (following_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_follows_follower ON follows(follower_id);
CREATE INDEX IF NOT EXISTS idx_follows_following ON follows(following_id);

-- Reactions on workout logs
CREATE TABLE IF NOT EXISTS workout_log_likes (
    user_id TEXT NOT NULL,
    log_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, log_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (log_id) REFERENCES workout_logs(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS workout_log_comments (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    log_id TEXT NOT NULL,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (log_id) REFERENCES workout_logs(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_workout_log_comments_log ON workout_log_comments(log_id);
"#;

/// Demo exercise catalog seeded on startup: (name, muscle_group, difficulty, equipment, video_url)
pub const DEMO_EXERCISES: &[(&str, &str, &str, &str, &str)] = &[
    // Chest
    ("Push-up", "chest", "beginner", "bodyweight", "https://www.youtube.com/watch?v=_l3ySVKYVJ8"),
    ("Bench Press", "chest", "intermediate", "barbell", "https://www.youtube.com/watch?v=rT7DgCr-3pg"),
    ("Chest Fly", "chest", "beginner", "dumbbells", "https://www.youtube.com/watch?v=IODxDxX7oi4"),
    ("Decline Push-up", "chest", "intermediate", "bodyweight", "https://www.youtube.com/watch?v=J0DnG1_S92I"),
    // Back
    ("Pull-up", "back", "intermediate", "pull-up bar", "https://www.youtube.com/watch?v=eGo4IYlbE5g"),
    ("Bent Over Row", "back", "intermediate", "barbell", "https://www.youtube.com/watch?v=vT2GjY_Umpw"),
    ("Lat Pulldown", "back", "beginner", "cable machine", "https://www.youtube.com/watch?v=GZbfZ033f74"),
    ("Seated Cable Row", "back", "beginner", "cable machine", "https://www.youtube.com/watch?v=6TSP1TRMUzs"),
    // Legs
    ("Squat", "legs", "beginner", "bodyweight", "https://www.youtube.com/watch?v=aclHkVaku9U"),
    ("Lunge", "legs", "beginner", "bodyweight", "https://www.youtube.com/watch?v=QOVaHwm-Q6U"),
    ("Leg Press", "legs", "intermediate", "machine", "https://www.youtube.com/watch?v=2SHsk9AzdjA"),
    ("Leg Extension", "legs", "beginner", "machine", "https://www.youtube.com/watch?v=ykJmrZ5v0Oo"),
    ("Romanian Deadlift", "legs", "intermediate", "barbell", "https://www.youtube.com/watch?v=1oed-UmAxFs"),
    // Arms
    ("Bicep Curl", "arms", "beginner", "dumbbells", "https://www.youtube.com/watch?v=ykJmrZ5v0Oo"),
    ("Hammer Curl", "arms", "beginner", "dumbbells", "https://www.youtube.com/watch?v=6kALZikXxLc"),
    ("Tricep Dips", "arms", "intermediate", "bodyweight", "https://www.youtube.com/watch?v=6kALZikXxLc"),
    ("Overhead Tricep Extension", "arms", "intermediate", "dumbbells", "https://www.youtube.com/watch?v=6kALZikXxLc"),
    // Shoulders
    ("Shoulder Press", "shoulders", "intermediate", "dumbbells", "https://www.youtube.com/watch?v=B-aVuyhvLHU"),
    ("Lateral Raise", "shoulders", "beginner", "dumbbells", "https://www.youtube.com/watch?v=3VcKaXpzqRo"),
    ("Front Raise", "shoulders", "beginner", "dumbbells", "https://www.youtube.com/watch?v=6drMZqmyXQc"),
    ("Rear Delt Fly", "shoulders", "intermediate", "dumbbells", "https://www.youtube.com/watch?v=0JfYxMRsUCQ"),
    ("Arnold Press", "shoulders", "advanced", "dumbbells", "https://www.youtube.com/watch?v=2yjwXTZQDDI"),
    // Core
    ("Plank", "core", "beginner", "bodyweight", "https://www.youtube.com/watch?v=AnYl6Nk9GOA"),
    ("Crunch", "core", "beginner", "bodyweight", "https://www.youtube.com/watch?v=1fbU_MkV7NE"),
    ("Russian Twist", "core", "beginner", "bodyweight", "https://www.youtube.com/watch?v=JB2oyawG9KI"),
    ("Bicycle Crunch", "core", "beginner", "bodyweight", "https://www.youtube.com/watch?v=1919eTCoESo"),
];
