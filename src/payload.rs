//! Payload shapes carried through the channel by the workloads.
//!
//! | Shape | Per-item cost |
//! |-------|---------------|
//! | `i32` | plain value, no allocation |
//! | `Box<SmallRecord>` | one heap object, 3 short string fields |
//! | `Box<LargeRecord>` | one heap object, 7 longer string fields |
//!
//! Records are boxed: every transit carries a freshly allocated object, and
//! their fields are string literals, so building one costs exactly that
//! allocation and nothing else.

/// A value the workloads build fresh on every iteration.
pub trait Payload: Sized + Send + 'static {
    /// Short name used in benchmark ids and logs.
    const NAME: &'static str;

    /// Builds the payload for iteration `iteration`.
    fn build(iteration: u32) -> Self;
}

impl Payload for i32 {
    const NAME: &'static str = "int";

    #[inline]
    fn build(iteration: u32) -> Self {
        iteration as i32
    }
}

/// Record with three short string fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SmallRecord {
    pub item1: &'static str,
    pub item2: &'static str,
    pub item3: &'static str,
}

impl SmallRecord {
    pub const fn new() -> Self {
        Self {
            item1: "123",
            item2: "456",
            item3: "789",
        }
    }
}

impl Default for SmallRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl Payload for Box<SmallRecord> {
    const NAME: &'static str = "small_record";

    #[inline]
    fn build(_: u32) -> Self {
        Box::new(SmallRecord::new())
    }
}

/// Record with seven 24-character string fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LargeRecord {
    pub item1: &'static str,
    pub item2: &'static str,
    pub item3: &'static str,
    pub item4: &'static str,
    pub item5: &'static str,
    pub item6: &'static str,
    pub item7: &'static str,
}

impl LargeRecord {
    pub const fn new() -> Self {
        Self {
            item1: "123123123123123123123123",
            item2: "456456456456456456456456",
            item3: "789789789789789789789789",
            item4: "abcabcabcabcabcabcabcabc",
            item5: "defdefdefdefdefdefdefdef",
            item6: "zzzzzzzzzzzzzzzzzzzzzzzz",
            item7: "uyytuyytuyytuyytuyytuyyt",
        }
    }
}

impl Default for LargeRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl Payload for Box<LargeRecord> {
    const NAME: &'static str = "large_record";

    #[inline]
    fn build(_: u32) -> Self {
        Box::new(LargeRecord::new())
    }
}
