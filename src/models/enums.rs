use std::{fmt, str::FromStr};

use anyhow::anyhow;
use diesel::{
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    serialize::{self, Output, ToSql},
    sql_types::Text,
};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Enumerations stored as `text` columns and exchanged as their variant name.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, AsExpression, FromSqlRow)]
        #[diesel(sql_type = Text)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $(stringify!($variant) => Ok($name::$variant),)+
                    other => Err(anyhow!("unknown {} value: {other}", stringify!($name))),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = String::deserialize(deserializer)?;
                value.parse().map_err(de::Error::custom)
            }
        }

        impl ToSql<Text, Pg> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                <str as ToSql<Text, Pg>>::to_sql(self.as_str(), out)
            }
        }

        impl FromSql<Text, Pg> for $name {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                let value = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
                value.parse::<$name>().map_err(|e| e.into())
            }
        }
    };
}

text_enum!(PropertyType {
    Rooms,
    Tinyhouse,
    Apartment,
    Villa,
    Townhouse,
    Cottage,
});

text_enum!(Amenity {
    WasherDryer,
    AirConditioning,
    Dishwasher,
    HighSpeedInternet,
    HardwoodFloors,
    WalkInClosets,
    Microwave,
    Refrigerator,
    Pool,
    Gym,
    Parking,
    PetsAllowed,
    WiFi,
});

text_enum!(Highlight {
    HighSpeedInternetAccess,
    WasherDryer,
    AirConditioning,
    Heating,
    SmokeFree,
    CableReady,
    SatelliteTV,
    DoubleVanities,
    TubShower,
    Intercom,
    SprinklerSystem,
    RecentlyRenovated,
    CloseToTransit,
    GreatView,
    QuietNeighborhood,
});

text_enum!(ApplicationStatus {
    Pending,
    Denied,
    Approved,
});

text_enum!(PaymentStatus {
    Pending,
    Paid,
    PartiallyPaid,
    Overdue,
});

/// Accepts either a JSON list or a single comma separated string, as sent by
/// multipart-style form bodies.
pub fn comma_separated<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrJoined {
        List(Vec<String>),
        Joined(String),
    }

    let raw = match ListOrJoined::deserialize(deserializer)? {
        ListOrJoined::List(items) => items,
        ListOrJoined::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    };

    raw.iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.parse().map_err(de::Error::custom))
        .collect()
}
