use crate::domain::entities::TransactionType;
use crate::domain::types::UserId;

/// Request Router (spec.md §4.3): maps a caller's transaction type to a
/// `(from, to)` wallet-owner pair using the Treasury as the universal
/// counterparty.
///
/// The Treasury id is resolved once at boot and handed to this struct —
/// there is no lazy global here, following the "explicitly-passed
/// service context" redesign in spec.md §9.
#[derive(Debug, Clone, Copy)]
pub struct RequestRouter {
    treasury_id: UserId,
}

impl RequestRouter {
    pub fn new(treasury_id: UserId) -> Self {
        Self { treasury_id }
    }

    pub fn treasury_id(&self) -> UserId {
        self.treasury_id
    }

    /// Resolves `(from_user, to_user)` for a transaction initiated by
    /// `user_id`. TOP_UP and BONUS credit the user from the Treasury;
    /// SPEND debits the user into the Treasury.
    pub fn resolve(&self, user_id: UserId, transaction_type: TransactionType) -> (UserId, UserId) {
        match transaction_type {
            TransactionType::TopUp | TransactionType::Bonus => (self.treasury_id, user_id),
            TransactionType::Spend => (user_id, self.treasury_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TransactionType::TopUp)]
    #[case(TransactionType::Bonus)]
    fn credits_route_treasury_to_user(#[case] transaction_type: TransactionType) {
        let treasury = UserId::new();
        let user = UserId::new();
        let router = RequestRouter::new(treasury);

        let (from, to) = router.resolve(user, transaction_type);

        assert_eq!(from, treasury);
        assert_eq!(to, user);
    }

    #[test]
    fn spend_routes_user_to_treasury() {
        let treasury = UserId::new();
        let user = UserId::new();
        let router = RequestRouter::new(treasury);

        let (from, to) = router.resolve(user, TransactionType::Spend);

        assert_eq!(from, user);
        assert_eq!(to, treasury);
    }
}
