//! Shared constants for end-to-end tests

pub const SONG_1_ID: &str = "SOUPIRU12A6D4FA1E1";
pub const SONG_1_TITLE: &str = "Der Kleine Dompfaff";
pub const ARTIST_1_ID: &str = "ARJIE2Y1187B994AB7";
pub const ARTIST_1_NAME: &str = "Line Renaud";
pub const SONG_1_DURATION: f64 = 152.92036;

pub const SONG_2_ID: &str = "SOMZWCG12A8C13C480";
pub const SONG_2_TITLE: &str = "I Didn't Mean To";
pub const ARTIST_2_ID: &str = "ARD7TVE1187B99BFB1";
pub const ARTIST_2_NAME: &str = "Casual";
pub const SONG_2_DURATION: f64 = 218.93179;

pub const USER_ID: &str = "26";

/// 2018-11-03 00:59:56.796 UTC
pub const TS_1: i64 = 1541206796796;
pub const TS_2: i64 = 1541207123796;
pub const TS_3: i64 = 1541207150796;
