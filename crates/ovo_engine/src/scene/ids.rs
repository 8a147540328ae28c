//! Per-scene identity and light-slot allocation
//!
//! Both counters live in the owning [`Scene`](super::Scene), so independent
//! scenes (and tests) never share state.

use std::fmt;

slotmap::new_key_type! {
    /// Arena handle of a scene node
    pub struct NodeId;
}

/// Object identity; 0 is reserved for "nothing"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Reserved id meaning "no object"
    pub const NONE: Self = Self(0);

    /// Raw value
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Flat picking color: red holds the low byte, then green, then blue
    #[must_use]
    pub const fn to_pick_color(self) -> [u8; 3] {
        let [r, g, b, _] = self.0.to_le_bytes();
        [r, g, b]
    }

    /// Decode a picking color; black means no object
    #[must_use]
    pub const fn from_pick_color(color: [u8; 3]) -> Option<Self> {
        let raw = u32::from_le_bytes([color[0], color[1], color[2], 0]);
        if raw == 0 {
            None
        } else {
            Some(Self(raw))
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic object id counter
///
/// Ids start at 1. Releasing the most recently issued id rolls the counter
/// back so create/destroy pairs in tests see stable ids.
#[derive(Debug, Clone)]
pub struct ObjectIdAllocator {
    next: u32,
}

impl Default for ObjectIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectIdAllocator {
    /// Fresh counter
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Issue the next id
    pub fn allocate(&mut self) -> ObjectId {
        let id = ObjectId(self.next);
        self.next = self.next.wrapping_add(1).max(1);
        id
    }

    /// Return an id; only the latest one is actually reused
    pub fn release(&mut self, id: ObjectId) {
        if id.0 != 0 && id.0.wrapping_add(1) == self.next {
            self.next = id.0;
        }
    }

    /// Id the next `allocate` returns
    #[must_use]
    pub const fn peek(&self) -> ObjectId {
        ObjectId(self.next)
    }

    /// Start again from 1
    pub fn reset(&mut self) {
        self.next = 1;
    }
}

/// Bounded pool of light slots
///
/// Allocation hands out the lowest free slot. When every slot is taken the
/// request fails with a warning and the light stays unbound.
#[derive(Debug, Clone)]
pub struct LightSlotAllocator {
    in_use: Vec<bool>,
}

impl LightSlotAllocator {
    /// Pool with `max` slots
    #[must_use]
    pub fn new(max: u32) -> Self {
        Self {
            in_use: vec![false; max as usize],
        }
    }

    /// Slot count
    #[must_use]
    pub fn max(&self) -> u32 {
        self.in_use.len() as u32
    }

    /// Slots currently handed out
    #[must_use]
    pub fn in_use(&self) -> u32 {
        self.in_use.iter().filter(|&&used| used).count() as u32
    }

    /// Take the lowest free slot
    pub fn allocate(&mut self) -> Option<u32> {
        if let Some(slot) = self.in_use.iter().position(|&used| !used) {
            self.in_use[slot] = true;
            Some(slot as u32)
        } else {
            log::warn!(
                "Maximum number of lights exceeded ({}); light will not be bound",
                self.max()
            );
            None
        }
    }

    /// Give a slot back
    pub fn release(&mut self, slot: u32) {
        if let Some(used) = self.in_use.get_mut(slot as usize) {
            *used = false;
        }
    }

    /// Free every slot
    pub fn reset(&mut self) {
        self.in_use.fill(false);
    }

    /// Drop every slot at or above `max`
    pub fn truncate(&mut self, max: u32) {
        self.in_use.truncate(max as usize);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_start_at_one_and_roll_back() {
        let mut ids = ObjectIdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        assert_eq!((a.get(), b.get()), (1, 2));

        // Releasing an older id does not move the counter
        ids.release(a);
        assert_eq!(ids.peek(), ObjectId(3));

        ids.release(b);
        assert_eq!(ids.allocate(), ObjectId(2));

        ids.reset();
        assert_eq!(ids.allocate(), ObjectId(1));
    }

    #[test]
    fn test_pick_color_encoding() {
        assert_eq!(ObjectId(7).to_pick_color(), [7, 0, 0]);
        assert_eq!(ObjectId(0x0102_03).to_pick_color(), [3, 2, 1]);
        assert_eq!(ObjectId::from_pick_color([3, 2, 1]), Some(ObjectId(0x0102_03)));
        assert_eq!(ObjectId::from_pick_color([0, 0, 0]), None);
    }

    #[test]
    fn test_light_slots_reuse_lowest_free() {
        let mut slots = LightSlotAllocator::new(3);
        assert_eq!(slots.allocate(), Some(0));
        assert_eq!(slots.allocate(), Some(1));
        assert_eq!(slots.allocate(), Some(2));
        assert_eq!(slots.allocate(), None);

        slots.release(1);
        assert_eq!(slots.in_use(), 2);
        assert_eq!(slots.allocate(), Some(1));

        slots.reset();
        assert_eq!(slots.in_use(), 0);

        slots.truncate(1);
        assert_eq!(slots.max(), 1);
        assert_eq!(slots.allocate(), Some(0));
        assert_eq!(slots.allocate(), None);
    }
}
