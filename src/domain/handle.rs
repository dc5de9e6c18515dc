//! Object identity: raw ids, typed handles, and the canonical collision key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// World-unique object id. Never reused within a run; 0 is never issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(ObjectId);

        impl $name {
            #[inline]
            pub(crate) fn from_object_id(id: ObjectId) -> Self {
                Self(id)
            }

            #[inline]
            pub fn object_id(self) -> ObjectId {
                self.0
            }
        }

        impl From<$name> for ObjectId {
            fn from(handle: $name) -> ObjectId {
                handle.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", stringify!($name), self.0)
            }
        }
    };
}

define_handle!(
    /// A point, linear state or particle.
    BodyId
);
define_handle!(
    /// A standalone angular state (wheels own one as well).
    AngularId
);
define_handle!(WheelId);
define_handle!(SegmentId);
define_handle!(
    /// A scalar-rest-length spring.
    SpringId
);
define_handle!(
    /// A rigid, vector-rest-length spring.
    FixedSpringId
);
define_handle!(AngularSpringId);
define_handle!(MotorId);
define_handle!(GearId);

/// Any link an angular spring can measure against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkId {
    Linear(SpringId),
    Fixed(FixedSpringId),
}

impl LinkId {
    pub fn object_id(self) -> ObjectId {
        match self {
            LinkId::Linear(id) => id.object_id(),
            LinkId::Fixed(id) => id.object_id(),
        }
    }
}

impl From<SpringId> for LinkId {
    fn from(id: SpringId) -> Self {
        LinkId::Linear(id)
    }
}

impl From<FixedSpringId> for LinkId {
    fn from(id: FixedSpringId) -> Self {
        LinkId::Fixed(id)
    }
}

/// Canonical unordered pair of object ids; `low <= high` always.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollisionKey {
    low: ObjectId,
    high: ObjectId,
}

impl CollisionKey {
    pub fn new(a: ObjectId, b: ObjectId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    #[inline]
    pub fn pair(self) -> (ObjectId, ObjectId) {
        (self.low, self.high)
    }

    #[inline]
    pub fn contains(self, id: ObjectId) -> bool {
        self.low == id || self.high == id
    }

    /// Pack into a single `u64` (`low << 32 | high`).
    #[inline]
    pub fn pack(self) -> u64 {
        ((self.low.0 as u64) << 32) | self.high.0 as u64
    }

    /// Inverse of [`CollisionKey::pack`]. Re-canonicalizes, so any `u64` decodes.
    #[inline]
    pub fn unpack(packed: u64) -> Self {
        Self::new(ObjectId((packed >> 32) as u32), ObjectId(packed as u32))
    }
}

impl fmt::Display for CollisionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low.0, self.high.0)
    }
}
