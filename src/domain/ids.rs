use uuid::Uuid;

/// Source of payment and favorite identifiers.
///
/// Implementations must never hand out the same id twice over their lifetime.
pub trait IdGenerator {
    fn next_id(&mut self) -> Uuid;
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self) -> Uuid {
        (**self).next_id()
    }
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Predictable ids for tests and scripted sessions:
/// 00000000-0000-0000-0000-000000000001, ...02, and so on.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    last: u128,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Uuid {
        self.last += 1;
        Uuid::from_u128(self.last)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_sequential_ids_are_predictable() {
        let mut ids = SequentialIds::new();
        assert_eq!(
            ids.next_id().to_string(),
            "00000000-0000-0000-0000-000000000001"
        );
        assert_eq!(
            ids.next_id().to_string(),
            "00000000-0000-0000-0000-000000000002"
        );
    }

    #[test]
    fn test_random_ids_do_not_repeat() {
        let mut ids = RandomIds;
        let seen: HashSet<Uuid> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_boxed_generator_delegates() {
        let mut ids: Box<dyn IdGenerator> = Box::new(SequentialIds::new());
        assert_eq!(ids.next_id(), Uuid::from_u128(1));
        assert_eq!(ids.next_id(), Uuid::from_u128(2));
    }
}
