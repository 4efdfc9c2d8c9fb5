use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! snowflake {
    ($name:ident, $mention:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            /// Chat markup that renders as a link to this entity.
            pub fn mention(&self) -> String {
                format!($mention, self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake!(ChannelId, "<#{}>");
snowflake!(MessageId, "{}");
snowflake!(UserId, "<@{}>");
snowflake!(RoleId, "<@&{}>");
