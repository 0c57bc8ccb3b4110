use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::PoolError,
    utils::{expand_words, fee_amount, next_min_bid, random_index},
};

#[account]
#[derive(InitSpace)]
pub struct Registry {
    pub admin: Pubkey,
    pub bump: u8,

    /// Key allowed to deliver randomness through `fulfill_randomness`.
    pub oracle: Pubkey,

    pub paused: bool,
    pub pool_count: u64,
    pub version: u16,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Default, Debug)]
pub enum PoolKind {
    /// One token of a supply-1 mint per unit.
    #[default]
    SingleUnit,
    /// `units_per_deposit` tokens of a 0-decimals mint per unit.
    MultiUnit,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Default, Debug)]
pub enum BidCurve {
    /// Each bid must add `bid_delta` base units.
    #[default]
    Linear,
    /// Each bid must add `bid_delta` bps of the highest bid.
    Exponential,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug)]
pub struct ReservedUnit {
    pub mint: Pubkey,
    pub unlock_at: i64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug)]
pub struct ActiveAuction {
    pub mint: Pubkey,
    pub auction_id: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug)]
pub struct UnitWeight {
    pub mint: Pubkey,
    pub weight_bps: u16,
}

/// Arguments of `create_pool`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct PoolParams {
    pub collection: Pubkey,
    pub kind: PoolKind,
    pub units_per_deposit: u64,
    pub lock_duration: i64,
    pub auction_duration: i64,
    pub unit_price: u64,
    pub fee_bps: u16,
    /// Defaults to the pool creator.
    pub fee_recipient: Option<Pubkey>,
    pub min_bid: u64,
    pub bid_curve: BidCurve,
    pub bid_delta: u64,
    pub initial_units: Vec<Pubkey>,
    pub sale_weights: Vec<UnitWeight>,
}

impl PoolParams {
    pub fn validate(&self) -> Result<()> {
        require!(self.fee_bps as u64 <= BPS_DENOMINATOR, PoolError::InvalidFeeBps);
        require!(self.lock_duration >= 0, PoolError::InvalidDuration);
        require!(self.auction_duration > 0, PoolError::InvalidDuration);
        require!(self.unit_price > 0, PoolError::InvalidUnitPrice);
        match self.kind {
            PoolKind::SingleUnit => {
                require!(self.units_per_deposit == 1, PoolError::InvalidUnitsPerDeposit)
            }
            PoolKind::MultiUnit => {
                require!(self.units_per_deposit > 0, PoolError::InvalidUnitsPerDeposit)
            }
        }
        require!(self.min_bid > 0, PoolError::InvalidPoolParams);
        if self.bid_curve == BidCurve::Exponential {
            // a zero step would accept equal re-bids forever
            require!(self.bid_delta > 0, PoolError::InvalidPoolParams);
        }
        require!(
            self.initial_units.len() <= MAX_INITIAL_UNITS,
            PoolError::InvalidPoolParams
        );
        require!(
            self.sale_weights.len() <= MAX_SALE_WEIGHTS,
            PoolError::InvalidPoolParams
        );

        let mut seen: Vec<Pubkey> = Vec::with_capacity(self.initial_units.len());
        for unit in self.initial_units.iter() {
            require!(!seen.contains(unit), PoolError::DuplicateUnit);
            seen.push(*unit);
        }
        for w in self.sale_weights.iter() {
            require!(w.weight_bps > 0, PoolError::InvalidPoolParams);
        }
        Ok(())
    }
}

#[account]
#[derive(InitSpace, Default)]
pub struct Pool {
    pub registry: Pubkey,
    pub index: u64,
    pub bump: u8,
    pub version: u16,

    pub creator: Pubkey,
    pub fee_recipient: Pubkey,
    pub collection: Pubkey,
    pub kind: PoolKind,
    pub units_per_deposit: u64,

    pub lock_duration: i64,
    pub auction_duration: i64,
    pub unit_price: u64,
    pub fee_bps: u16,

    pub min_bid: u64,
    pub bid_curve: BidCurve,
    pub bid_delta: u64,

    pub claim_mint: Pubkey,
    /// None = bids are paid in lamports into the bid escrow.
    pub payment_mint: Option<Pubkey>,
    pub payment_vault: Option<Pubkey>,
    pub bid_escrow: Pubkey,
    pub bid_escrow_bump: u8,

    /// Units eligible for random selection.
    #[max_len(64)]
    pub reserved: Vec<ReservedUnit>,
    #[max_len(16)]
    pub in_auction: Vec<ActiveAuction>,
    /// Swap source units held aside until their request is fulfilled or cancelled.
    #[max_len(16)]
    pub incoming: Vec<Pubkey>,
    /// Listed by the creator at creation, not yet seeded.
    #[max_len(16)]
    pub initial_units: Vec<Pubkey>,
    #[max_len(16)]
    pub sale_weights: Vec<UnitWeight>,

    /// Units promised to pending randomness requests.
    pub pending_units: u32,

    pub next_auction_id: u64,
    pub next_request_id: u64,

    pub locked_count: u64,
    pub released_count: u64,
    pub auctioned_count: u64,
    pub total_minted: u64,
    pub total_burned: u64,
}

impl Pool {
    pub fn configure(&mut self, params: &PoolParams, creator: Pubkey) -> Result<()> {
        params.validate()?;

        self.creator = creator;
        self.fee_recipient = params.fee_recipient.unwrap_or(creator);
        self.collection = params.collection;
        self.kind = params.kind;
        self.units_per_deposit = params.units_per_deposit;
        self.lock_duration = params.lock_duration;
        self.auction_duration = params.auction_duration;
        self.unit_price = params.unit_price;
        self.fee_bps = params.fee_bps;
        self.min_bid = params.min_bid;
        self.bid_curve = params.bid_curve;
        self.bid_delta = params.bid_delta;
        self.initial_units = params.initial_units.clone();
        self.sale_weights = params.sale_weights.clone();
        self.version = POOL_VERSION;
        Ok(())
    }

    /// Token amount moved per logical unit.
    pub fn unit_amount(&self) -> u64 {
        match self.kind {
            PoolKind::SingleUnit => 1,
            PoolKind::MultiUnit => self.units_per_deposit,
        }
    }

    pub fn is_reserved(&self, mint: &Pubkey) -> bool {
        self.reserved.iter().any(|u| u.mint == *mint)
    }

    pub fn auction_of(&self, mint: &Pubkey) -> Option<u64> {
        self.in_auction
            .iter()
            .find(|a| a.mint == *mint)
            .map(|a| a.auction_id)
    }

    /// True while the pool custodies the unit in any role.
    pub fn holds(&self, mint: &Pubkey) -> bool {
        self.is_reserved(mint) || self.auction_of(mint).is_some() || self.incoming.contains(mint)
    }

    /// Reserved units not yet promised to a pending request.
    pub fn eligible_units(&self) -> u32 {
        (self.reserved.len() as u32).saturating_sub(self.pending_units)
    }

    fn check_new_units(&self, mints: &[Pubkey]) -> Result<()> {
        require!(
            !mints.is_empty() && mints.len() <= MAX_BATCH,
            PoolError::EmptyUnitList
        );
        for (i, mint) in mints.iter().enumerate() {
            require!(!self.holds(mint), PoolError::DuplicateUnit);
            require!(!mints[..i].contains(mint), PoolError::DuplicateUnit);
        }
        require!(
            self.custodied_units() + mints.len() <= MAX_RESERVED_UNITS,
            PoolError::PoolFull
        );
        Ok(())
    }

    /// Units counted against the capacity: reserved plus in auction.
    /// Unsold units move back from auction, so the reserved set never outgrows the cap.
    pub fn custodied_units(&self) -> usize {
        self.reserved.len() + self.in_auction.len()
    }

    /// Lock-in: reserves the units and returns the claim amount to mint.
    pub fn lock_units(&mut self, mints: &[Pubkey], now: i64) -> Result<u64> {
        self.check_new_units(mints)?;

        let n = mints.len() as u64;
        let minted = self
            .unit_price
            .checked_mul(n)
            .ok_or(PoolError::MathOverflow)?;
        let unlock_at = now
            .checked_add(self.lock_duration)
            .ok_or(PoolError::MathOverflow)?;
        let locked_count = self.locked_count.checked_add(n).ok_or(PoolError::MathOverflow)?;
        let total_minted = self
            .total_minted
            .checked_add(minted)
            .ok_or(PoolError::MathOverflow)?;

        self.reserved
            .extend(mints.iter().map(|mint| ReservedUnit { mint: *mint, unlock_at }));
        self.locked_count = locked_count;
        self.total_minted = total_minted;

        Ok(minted)
    }

    /// Creator seeding of listed units: immediately auctionable, not claim-backed.
    pub fn seed_units(&mut self, mints: &[Pubkey], now: i64) -> Result<()> {
        self.check_new_units(mints)?;
        for mint in mints.iter() {
            require!(self.initial_units.contains(mint), PoolError::UnitNotListed);
        }

        self.initial_units.retain(|u| !mints.contains(u));
        self.reserved
            .extend(mints.iter().map(|mint| ReservedUnit { mint: *mint, unlock_at: now }));
        Ok(())
    }

    pub fn min_first_bid(&self, mint: &Pubkey) -> Result<u64> {
        let weight = self
            .sale_weights
            .iter()
            .find(|w| w.mint == *mint)
            .map(|w| w.weight_bps)
            .unwrap_or(DEFAULT_SALE_WEIGHT_BPS);
        let min = (self.min_bid as u128)
            .checked_mul(weight as u128)
            .ok_or(PoolError::MathOverflow)?
            / BPS_DENOMINATOR as u128;
        // a tiny weight still needs a non-zero opening bid
        Ok(u64::try_from(min).map_err(|_| error!(PoolError::MathOverflow))?.max(1))
    }

    /// Moves a reserved unit into auction and returns the new auction id.
    pub fn begin_auction(&mut self, mint: &Pubkey, now: i64) -> Result<u64> {
        require!(self.auction_of(mint).is_none(), PoolError::AlreadyStarted);
        let idx = self
            .reserved
            .iter()
            .position(|u| u.mint == *mint)
            .ok_or(PoolError::UnitNotReserved)?;
        require!(now >= self.reserved[idx].unlock_at, PoolError::LockNotElapsed);
        // units already promised to pending requests stay in the set
        require!(
            self.reserved.len() as u32 > self.pending_units,
            PoolError::InsufficientReservedUnits
        );
        require!(
            self.in_auction.len() < MAX_ACTIVE_AUCTIONS,
            PoolError::PoolFull
        );

        let auction_id = self.next_auction_id;
        self.next_auction_id = auction_id.checked_add(1).ok_or(PoolError::MathOverflow)?;
        self.reserved.swap_remove(idx);
        self.in_auction.push(ActiveAuction { mint: *mint, auction_id });
        Ok(auction_id)
    }

    /// Ends `auction` and releases its unit on the pool side in one step.
    pub fn settle_auction(&mut self, auction: &mut Auction, now: i64) -> Result<Option<(Pubkey, u64)>> {
        let winner = auction.settle(now)?;
        self.finish_auction(&auction.unit, winner.is_some(), now)?;
        Ok(winner)
    }

    /// Closes the pool side of an auction. Unsold units return to the reserved set.
    pub fn finish_auction(&mut self, mint: &Pubkey, sold: bool, now: i64) -> Result<()> {
        let idx = self
            .in_auction
            .iter()
            .position(|a| a.mint == *mint)
            .ok_or(PoolError::UnitNotReserved)?;
        self.in_auction.swap_remove(idx);

        if sold {
            self.auctioned_count = self
                .auctioned_count
                .checked_add(1)
                .ok_or(PoolError::MathOverflow)?;
        } else {
            self.reserved.push(ReservedUnit { mint: *mint, unlock_at: now });
        }
        Ok(())
    }

    /// Splits a redeem of `count` units into (total, fee, burn).
    pub fn redeem_split(&self, count: u32) -> Result<(u64, u64, u64)> {
        let total = self
            .unit_price
            .checked_mul(count as u64)
            .ok_or(PoolError::MathOverflow)?;
        let fee = fee_amount(total, self.fee_bps)?;
        let burn = total.checked_sub(fee).ok_or(PoolError::MathOverflow)?;
        Ok((total, fee, burn))
    }

    pub fn swap_fee(&self) -> Result<u64> {
        fee_amount(self.unit_price, self.fee_bps)
    }

    /// Promises `count` eligible units to a new request and returns its id.
    pub fn open_request(&mut self, count: u32) -> Result<u64> {
        require!(
            count > 0 && count <= MAX_UNITS_PER_REQUEST,
            PoolError::InvalidUnitCount
        );
        require!(
            self.eligible_units() >= count,
            PoolError::InsufficientReservedUnits
        );

        let request_id = self.next_request_id;
        self.next_request_id = request_id.checked_add(1).ok_or(PoolError::MathOverflow)?;
        self.pending_units = self
            .pending_units
            .checked_add(count)
            .ok_or(PoolError::MathOverflow)?;
        Ok(request_id)
    }

    pub fn open_redeem(&mut self, count: u32) -> Result<(u64, u64, u64)> {
        let (_, fee, burn) = self.redeem_split(count)?;
        let total_burned = self
            .total_burned
            .checked_add(burn)
            .ok_or(PoolError::MathOverflow)?;
        let request_id = self.open_request(count)?;
        self.total_burned = total_burned;
        Ok((request_id, fee, burn))
    }

    /// Holds the swap source aside (never selectable for its own request).
    pub fn open_swap(&mut self, source: &Pubkey) -> Result<u64> {
        require!(!self.holds(source), PoolError::DuplicateUnit);
        require!(self.incoming.len() < MAX_INCOMING_UNITS, PoolError::PoolFull);
        let request_id = self.open_request(1)?;
        self.incoming.push(*source);
        Ok(request_id)
    }

    /// Picks `count` distinct reserved units from the oracle words, removing each from the
    /// set before the next pick.
    pub fn allocate(&mut self, count: u32, words: &[[u8; 32]]) -> Result<Vec<Pubkey>> {
        let words = expand_words(words, count)?;
        require!(self.pending_units >= count, PoolError::InsufficientReservedUnits);
        require!(
            self.reserved.len() >= count as usize,
            PoolError::InsufficientReservedUnits
        );

        let mut picked = Vec::with_capacity(words.len());
        for word in words.iter() {
            let idx = random_index(word, self.reserved.len())?;
            picked.push(self.reserved.swap_remove(idx).mint);
        }

        self.pending_units -= count;
        self.released_count = self
            .released_count
            .checked_add(count as u64)
            .ok_or(PoolError::MathOverflow)?;
        Ok(picked)
    }

    /// After a swap fulfillment the source unit becomes a regular locked unit.
    pub fn accept_swapped_unit(&mut self, source: &Pubkey, now: i64) -> Result<()> {
        let idx = self
            .incoming
            .iter()
            .position(|u| u == source)
            .ok_or(PoolError::UnitNotReserved)?;
        let unlock_at = now
            .checked_add(self.lock_duration)
            .ok_or(PoolError::MathOverflow)?;
        self.incoming.swap_remove(idx);
        self.reserved.push(ReservedUnit { mint: *source, unlock_at });
        Ok(())
    }

    /// Releases the promise of a cancelled request; returns the claim amount to re-mint.
    pub fn cancel_request(&mut self, request: &RandomnessRequest) -> Result<u64> {
        self.pending_units = self
            .pending_units
            .checked_sub(request.count)
            .ok_or(PoolError::MathOverflow)?;

        match request.kind {
            RequestKind::Redeem => {
                self.total_minted = self
                    .total_minted
                    .checked_add(request.burned)
                    .ok_or(PoolError::MathOverflow)?;
                Ok(request.burned)
            }
            RequestKind::Swap => {
                if let Some(source) = request.source_unit {
                    self.incoming.retain(|u| *u != source);
                }
                Ok(0)
            }
        }
    }
}

#[account]
#[derive(InitSpace, Default)]
pub struct Auction {
    pub pool: Pubkey,
    pub auction_id: u64,
    pub bump: u8,

    pub unit: Pubkey,
    pub highest_bidder: Option<Pubkey>,
    pub highest_bid: u64,

    pub start_time: i64,
    pub end_time: i64,
    pub ended: bool,
    pub ended_at: i64,
    pub bid_count: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct BidRule {
    pub min_first_bid: u64,
    pub curve: BidCurve,
    pub delta: u64,
}

impl Auction {
    pub fn open(
        &mut self,
        pool: Pubkey,
        auction_id: u64,
        unit: Pubkey,
        now: i64,
        duration: i64,
    ) -> Result<()> {
        self.pool = pool;
        self.auction_id = auction_id;
        self.unit = unit;
        self.highest_bidder = None;
        self.highest_bid = 0;
        self.start_time = now;
        self.end_time = now.checked_add(duration).ok_or(PoolError::MathOverflow)?;
        self.ended = false;
        self.ended_at = 0;
        self.bid_count = 0;
        Ok(())
    }

    /// Accepts a bid and returns the displaced (bidder, amount) that must be refunded.
    pub fn place_bid(
        &mut self,
        bidder: Pubkey,
        amount: u64,
        now: i64,
        rule: &BidRule,
    ) -> Result<Option<(Pubkey, u64)>> {
        require!(!self.ended, PoolError::AuctionClosed);
        require!(now < self.end_time, PoolError::AuctionClosed);

        let displaced = match self.highest_bidder {
            None => {
                require!(amount >= rule.min_first_bid, PoolError::BidTooLow);
                None
            }
            Some(prev) => {
                let min = next_min_bid(self.highest_bid, rule.curve, rule.delta)?;
                require!(amount >= min, PoolError::InsufficientBid);
                Some((prev, self.highest_bid))
            }
        };

        self.bid_count = self.bid_count.checked_add(1).ok_or(PoolError::MathOverflow)?;
        self.highest_bidder = Some(bidder);
        self.highest_bid = amount;
        Ok(displaced)
    }

    /// Terminal transition; returns the winning (bidder, amount) if any.
    pub fn settle(&mut self, now: i64) -> Result<Option<(Pubkey, u64)>> {
        require!(!self.ended, PoolError::AlreadyEnded);
        require!(now >= self.end_time, PoolError::AuctionNotElapsed);

        self.ended = true;
        self.ended_at = now;
        Ok(self.highest_bidder.map(|b| (b, self.highest_bid)))
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Default, Debug)]
pub enum RequestKind {
    #[default]
    Redeem,
    Swap,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Default, Debug)]
pub enum RequestStatus {
    #[default]
    Pending,
    Fulfilled,
    Cancelled,
}

#[account]
#[derive(InitSpace, Default)]
pub struct RandomnessRequest {
    pub pool: Pubkey,
    pub request_id: u64,
    pub bump: u8,

    pub requester: Pubkey,
    pub count: u32,
    pub kind: RequestKind,
    pub source_unit: Option<Pubkey>,

    /// Claim tokens burned at request time (re-minted on cancel).
    pub burned: u64,
    pub fee_paid: u64,

    pub requested_at: i64,
    pub status: RequestStatus,
    pub settled_at: i64,

    #[max_len(8)]
    pub allocated: Vec<Pubkey>,
}

impl RandomnessRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub fn ensure_pending(&self) -> Result<()> {
        require!(self.is_pending(), PoolError::UnknownRequest);
        Ok(())
    }

    pub fn fulfill(&mut self, allocated: Vec<Pubkey>, now: i64) -> Result<()> {
        self.ensure_pending()?;
        require!(
            allocated.len() == self.count as usize,
            PoolError::InvalidUnitCount
        );
        self.status = RequestStatus::Fulfilled;
        self.allocated = allocated;
        self.settled_at = now;
        Ok(())
    }

    pub fn cancel(&mut self, now: i64) -> Result<()> {
        self.ensure_pending()?;
        let expires_at = self
            .requested_at
            .checked_add(REQUEST_TIMEOUT_SECS)
            .ok_or(PoolError::MathOverflow)?;
        require!(now >= expires_at, PoolError::RequestNotExpired);
        self.status = RequestStatus::Cancelled;
        self.settled_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    const ONE: u64 = 1_000_000_000;
    const DAY: i64 = 86_400;

    fn code(err: Error) -> u32 {
        match err {
            Error::AnchorError(e) => e.error_code_number,
            _ => u32::MAX,
        }
    }

    fn assert_err<T: std::fmt::Debug>(res: Result<T>, expected: PoolError) {
        let err = res.expect_err("expected an error");
        assert_eq!(code(err), u32::from(expected));
    }

    fn word(v: u64) -> [u8; 32] {
        let mut w = [0u8; 32];
        w[24..].copy_from_slice(&v.to_be_bytes());
        w
    }

    fn params() -> PoolParams {
        PoolParams {
            collection: Pubkey::new_unique(),
            kind: PoolKind::SingleUnit,
            units_per_deposit: 1,
            lock_duration: DAY,
            auction_duration: DAY,
            unit_price: 2 * ONE,
            fee_bps: 500,
            fee_recipient: None,
            min_bid: ONE / 10,
            bid_curve: BidCurve::Linear,
            bid_delta: ONE,
            initial_units: vec![],
            sale_weights: vec![],
        }
    }

    fn pool() -> (Pool, Pubkey) {
        let creator = Pubkey::new_unique();
        let mut pool = Pool::default();
        pool.configure(&params(), creator).unwrap();
        (pool, creator)
    }

    fn units(n: usize) -> Vec<Pubkey> {
        (0..n).map(|_| Pubkey::new_unique()).collect()
    }

    fn rule(pool: &Pool, unit: &Pubkey) -> BidRule {
        BidRule {
            min_first_bid: pool.min_first_bid(unit).unwrap(),
            curve: pool.bid_curve,
            delta: pool.bid_delta,
        }
    }

    fn new_request(pool: &Pubkey, id: u64, kind: RequestKind, count: u32, now: i64) -> RandomnessRequest {
        RandomnessRequest {
            pool: *pool,
            request_id: id,
            requester: Pubkey::new_unique(),
            count,
            kind,
            requested_at: now,
            ..Default::default()
        }
    }

    #[test]
    fn configure_defaults_fee_recipient_to_creator() {
        let (pool, creator) = pool();
        assert_eq!(pool.fee_recipient, creator);
        assert_eq!(pool.version, POOL_VERSION);
        assert_eq!(pool.unit_amount(), 1);
    }

    #[test]
    fn params_validation() {
        let mut p = params();
        p.fee_bps = 10_001;
        assert_err(p.validate(), PoolError::InvalidFeeBps);

        let mut p = params();
        p.units_per_deposit = 3;
        assert_err(p.validate(), PoolError::InvalidUnitsPerDeposit);

        let mut p = params();
        p.kind = PoolKind::MultiUnit;
        p.units_per_deposit = 3;
        assert!(p.validate().is_ok());

        let mut p = params();
        p.unit_price = 0;
        assert_err(p.validate(), PoolError::InvalidUnitPrice);

        let mut p = params();
        let u = Pubkey::new_unique();
        p.initial_units = vec![u, u];
        assert_err(p.validate(), PoolError::DuplicateUnit);
    }

    #[test]
    fn lock_mints_unit_price_per_unit() {
        let (mut pool, _) = pool();
        let mut expected = 0;
        for batch in [1usize, 3, 2] {
            let minted = pool.lock_units(&units(batch), 0).unwrap();
            assert_eq!(minted, pool.unit_price * batch as u64);
            expected += minted;
        }
        assert_eq!(pool.total_minted, expected);
        assert_eq!(pool.total_minted, pool.unit_price * pool.locked_count);
        assert_eq!(pool.reserved.len(), 6);
    }

    #[test]
    fn lock_scenario_three_units_mint_six() {
        let (mut pool, _) = pool();
        assert_eq!(pool.lock_units(&units(3), 0).unwrap(), 6 * ONE);
    }

    #[test]
    fn lock_rejects_duplicates_without_state_change() {
        let (mut pool, _) = pool();
        let u = units(2);
        pool.lock_units(&u, 0).unwrap();
        let before = pool.clone();

        let again = vec![Pubkey::new_unique(), u[1]];
        assert_err(pool.lock_units(&again, 5), PoolError::DuplicateUnit);

        let fresh = Pubkey::new_unique();
        assert_err(pool.lock_units(&[fresh, fresh], 5), PoolError::DuplicateUnit);

        assert_eq!(pool.reserved, before.reserved);
        assert_eq!(pool.total_minted, before.total_minted);
    }

    #[test]
    fn lock_rejects_empty_and_oversized_batches() {
        let (mut pool, _) = pool();
        assert_err(pool.lock_units(&[], 0), PoolError::EmptyUnitList);
        assert_err(pool.lock_units(&units(MAX_BATCH + 1), 0), PoolError::EmptyUnitList);
    }

    #[test]
    fn seed_only_listed_units() {
        let creator = Pubkey::new_unique();
        let listed = units(2);
        let mut p = params();
        p.initial_units = listed.clone();
        let mut pool = Pool::default();
        pool.configure(&p, creator).unwrap();

        assert_err(pool.seed_units(&[Pubkey::new_unique()], 0), PoolError::UnitNotListed);
        pool.seed_units(&listed[..1], 10).unwrap();
        assert_eq!(pool.initial_units, listed[1..].to_vec());
        assert_eq!(pool.total_minted, 0);
        // seeded units are auctionable at once
        pool.begin_auction(&listed[0], 10).unwrap();
    }

    #[test]
    fn start_auction_waits_for_lock() {
        let (mut pool, _) = pool();
        let u = units(1);
        pool.lock_units(&u, 100).unwrap();

        assert_err(pool.begin_auction(&u[0], 100 + DAY - 1), PoolError::LockNotElapsed);
        assert_eq!(pool.begin_auction(&u[0], 100 + DAY).unwrap(), 0);
        assert_err(pool.begin_auction(&u[0], 100 + DAY), PoolError::AlreadyStarted);
        assert_err(pool.begin_auction(&Pubkey::new_unique(), 100 + DAY), PoolError::UnitNotReserved);
    }

    #[test]
    fn start_auction_keeps_units_promised_to_requests() {
        let (mut pool, _) = pool();
        let u = units(2);
        pool.lock_units(&u, 0).unwrap();
        pool.open_redeem(2).unwrap();
        assert_err(pool.begin_auction(&u[0], DAY), PoolError::InsufficientReservedUnits);
    }

    #[test]
    fn auction_scenario() {
        let (mut pool, creator) = pool();
        let u = units(3);
        assert_eq!(pool.lock_units(&u, 0).unwrap(), 6 * ONE);

        let now = DAY;
        let id = pool.begin_auction(&u[0], now).unwrap();
        let mut auction = Auction::default();
        auction.open(Pubkey::new_unique(), id, u[0], now, pool.auction_duration).unwrap();
        let bid_rule = rule(&pool, &u[0]);

        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();

        assert_err(auction.place_bid(alice, ONE / 100, now + 1, &bid_rule), PoolError::BidTooLow);
        assert_eq!(auction.highest_bidder, None);

        assert_eq!(auction.place_bid(alice, ONE, now + 2, &bid_rule).unwrap(), None);

        assert_err(auction.place_bid(bob, ONE + ONE / 2, now + 3, &bid_rule), PoolError::InsufficientBid);
        assert_eq!(auction.highest_bidder, Some(alice));
        assert_eq!(auction.highest_bid, ONE);

        let refund = auction.place_bid(bob, 2 * ONE, now + 4, &bid_rule).unwrap();
        assert_eq!(refund, Some((alice, ONE)));
        assert_eq!(auction.bid_count, 2);

        assert_err(auction.settle(now + DAY - 1), PoolError::AuctionNotElapsed);
        let winner = auction.settle(now + DAY).unwrap();
        assert_eq!(winner, Some((bob, 2 * ONE)));
        assert_err(auction.settle(now + DAY + 5), PoolError::AlreadyEnded);
        assert_err(auction.place_bid(alice, 5 * ONE, now + DAY + 6, &bid_rule), PoolError::AuctionClosed);

        pool.finish_auction(&u[0], true, now + DAY).unwrap();
        assert!(!pool.holds(&u[0]));
        assert_eq!(pool.auctioned_count, 1);
        // the winning bid goes to the fee recipient, which defaults to the creator
        assert_eq!(pool.fee_recipient, creator);
        // auctions neither mint nor burn
        assert_eq!(pool.total_minted, 6 * ONE);
        assert_eq!(pool.total_burned, 0);
    }

    #[test]
    fn settle_auction_ends_record_and_releases_unit() {
        let (mut pool, _) = pool();
        let u = units(2);
        pool.lock_units(&u, 0).unwrap();

        // sold: handler hands a deref-able wrapper, like the program account
        let id = pool.begin_auction(&u[0], DAY).unwrap();
        let mut sold = Box::new(Auction::default());
        sold.open(Pubkey::new_unique(), id, u[0], DAY, pool.auction_duration).unwrap();
        let bidder = Pubkey::new_unique();
        sold.place_bid(bidder, ONE, DAY + 1, &rule(&pool, &u[0])).unwrap();

        assert_err(pool.settle_auction(&mut sold, 2 * DAY - 1), PoolError::AuctionNotElapsed);
        assert_eq!(pool.auction_of(&u[0]), Some(id));

        assert_eq!(pool.settle_auction(&mut sold, 2 * DAY).unwrap(), Some((bidder, ONE)));
        assert!(sold.ended);
        assert!(!pool.holds(&u[0]));
        assert_err(pool.settle_auction(&mut sold, 3 * DAY), PoolError::AlreadyEnded);

        // unsold: back into the reserved set
        let id = pool.begin_auction(&u[1], DAY).unwrap();
        let mut unsold = Box::new(Auction::default());
        unsold.open(Pubkey::new_unique(), id, u[1], DAY, pool.auction_duration).unwrap();
        assert_eq!(pool.settle_auction(&mut unsold, 2 * DAY).unwrap(), None);
        assert!(pool.is_reserved(&u[1]));
        assert_eq!(pool.auctioned_count, 1);
    }

    #[test]
    fn capacity_counts_units_in_auction() {
        let (mut pool, _) = pool();
        let batches: Vec<Vec<Pubkey>> = (0..MAX_RESERVED_UNITS / MAX_BATCH).map(|_| units(MAX_BATCH)).collect();
        for batch in batches.iter() {
            pool.lock_units(batch, 0).unwrap();
        }
        let first = batches[0][0];
        let id = pool.begin_auction(&first, DAY).unwrap();
        assert_eq!(pool.custodied_units(), MAX_RESERVED_UNITS);

        // a slot freed by the auction cannot be refilled while it runs
        assert_err(pool.lock_units(&units(1), DAY), PoolError::PoolFull);

        let mut auction = Auction::default();
        auction.open(Pubkey::new_unique(), id, first, DAY, pool.auction_duration).unwrap();
        pool.settle_auction(&mut auction, 2 * DAY).unwrap();
        assert_eq!(pool.reserved.len(), MAX_RESERVED_UNITS);
    }

    #[test]
    fn bids_close_at_end_time() {
        let mut auction = Auction::default();
        auction.open(Pubkey::new_unique(), 0, Pubkey::new_unique(), 0, 10).unwrap();
        let rule = BidRule { min_first_bid: 1, curve: BidCurve::Linear, delta: 1 };
        assert_err(auction.place_bid(Pubkey::new_unique(), 5, 10, &rule), PoolError::AuctionClosed);
    }

    #[test]
    fn unsold_unit_returns_to_reserved_set() {
        let (mut pool, _) = pool();
        let u = units(1);
        pool.lock_units(&u, 0).unwrap();
        let id = pool.begin_auction(&u[0], DAY).unwrap();

        let mut auction = Auction::default();
        auction.open(Pubkey::new_unique(), id, u[0], DAY, DAY).unwrap();
        assert_eq!(auction.settle(2 * DAY).unwrap(), None);

        pool.finish_auction(&u[0], false, 2 * DAY).unwrap();
        assert!(pool.is_reserved(&u[0]));
        // immediately eligible for a new auction
        assert_eq!(pool.begin_auction(&u[0], 2 * DAY).unwrap(), 1);
    }

    #[test]
    fn sale_weight_scales_first_bid() {
        let creator = Pubkey::new_unique();
        let weighted = Pubkey::new_unique();
        let mut p = params();
        p.sale_weights = vec![UnitWeight { mint: weighted, weight_bps: 2_000 }];
        let mut pool = Pool::default();
        pool.configure(&p, creator).unwrap();

        assert_eq!(pool.min_first_bid(&weighted).unwrap(), ONE / 50);
        assert_eq!(pool.min_first_bid(&Pubkey::new_unique()).unwrap(), ONE / 10);
    }

    #[test]
    fn exponential_curve_requires_bps_step() {
        let mut auction = Auction::default();
        auction.open(Pubkey::new_unique(), 0, Pubkey::new_unique(), 0, 100).unwrap();
        let rule = BidRule { min_first_bid: 100, curve: BidCurve::Exponential, delta: 1_000 };
        auction.place_bid(Pubkey::new_unique(), 1_000, 1, &rule).unwrap();
        assert_err(auction.place_bid(Pubkey::new_unique(), 1_099, 2, &rule), PoolError::InsufficientBid);
        assert!(auction.place_bid(Pubkey::new_unique(), 1_100, 3, &rule).unwrap().is_some());
    }

    #[test]
    fn redeem_split_routes_fee() {
        let (pool, _) = pool();
        // 2 units at price 2 with 5% fee
        let (total, fee, burn) = pool.redeem_split(2).unwrap();
        assert_eq!(total, 4 * ONE);
        assert_eq!(fee, 4 * ONE / 20);
        assert_eq!(burn, total - fee);
        assert_eq!(pool.swap_fee().unwrap(), 2 * ONE / 20);
    }

    #[test]
    fn redeem_scenario() {
        let (mut pool, _) = pool();
        let u = units(3);
        pool.lock_units(&u, 0).unwrap();
        pool.begin_auction(&u[0], DAY).unwrap();
        // swap-remove leaves [u2, u1]
        assert_eq!(pool.reserved.len(), 2);
        assert_eq!(pool.reserved[0].mint, u[2]);

        let (id, fee, burn) = pool.open_redeem(1).unwrap();
        assert_eq!(fee + burn, pool.unit_price);
        assert_eq!(pool.pending_units, 1);

        let pool_key = Pubkey::new_unique();
        let mut request = new_request(&pool_key, id, RequestKind::Redeem, 1, DAY);

        request.ensure_pending().unwrap();
        let picked = pool.allocate(request.count, &[word(123_456)]).unwrap();
        assert_eq!(picked, vec![u[2]]);
        request.fulfill(picked, DAY + 10).unwrap();

        assert!(!pool.is_reserved(&u[2]));
        assert_eq!(pool.pending_units, 0);
        assert_eq!(pool.released_count, 1);

        // consumed request is unknown thereafter
        assert_err(request.ensure_pending(), PoolError::UnknownRequest);
        assert_err(request.fulfill(vec![u[1]], DAY + 20), PoolError::UnknownRequest);
        assert_eq!(request.allocated, vec![u[2]]);
    }

    #[test]
    fn fulfillment_picks_distinct_units() {
        let (mut pool, _) = pool();
        let u = units(8);
        pool.lock_units(&u, 0).unwrap();
        pool.open_redeem(5).unwrap();

        // identical words still yield distinct units because the set shrinks
        let picked = pool.allocate(5, &[word(7); 5]).unwrap();
        let mut sorted = picked.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 5);
        for p in picked.iter() {
            assert!(u.contains(p));
            assert!(!pool.is_reserved(p));
        }
        assert_eq!(pool.reserved.len(), 3);
    }

    #[test]
    fn single_word_expands_for_multi_unit_redeem() {
        let (mut pool, _) = pool();
        pool.lock_units(&units(4), 0).unwrap();
        pool.open_redeem(2).unwrap();
        let picked = pool.allocate(2, &[word(99)]).unwrap();
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0], picked[1]);
    }

    #[test]
    fn bad_word_count_mutates_nothing() {
        let (mut pool, _) = pool();
        pool.lock_units(&units(4), 0).unwrap();
        pool.open_redeem(3).unwrap();
        let before = pool.clone();
        assert_err(pool.allocate(3, &[word(1), word(2)]), PoolError::InvalidRandomWords);
        assert_eq!(pool.reserved, before.reserved);
        assert_eq!(pool.pending_units, before.pending_units);
    }

    #[test]
    fn requests_cannot_overcommit_reserved_units() {
        let (mut pool, _) = pool();
        pool.lock_units(&units(3), 0).unwrap();
        pool.open_redeem(2).unwrap();
        assert_err(pool.open_redeem(2), PoolError::InsufficientReservedUnits);
        assert_err(pool.open_redeem(0), PoolError::InvalidUnitCount);
        assert_err(pool.open_redeem(MAX_UNITS_PER_REQUEST + 1), PoolError::InvalidUnitCount);
        pool.open_redeem(1).unwrap();
        assert_eq!(pool.eligible_units(), 0);
    }

    #[test]
    fn swap_source_is_not_selectable_for_its_own_request() {
        let (mut pool, _) = pool();
        let u = units(2);
        pool.lock_units(&u, 0).unwrap();

        let source = Pubkey::new_unique();
        pool.open_swap(&source).unwrap();
        assert!(pool.holds(&source));
        assert!(!pool.is_reserved(&source));
        assert_err(pool.lock_units(&[source], 1), PoolError::DuplicateUnit);
        assert_err(pool.open_swap(&source), PoolError::DuplicateUnit);

        let picked = pool.allocate(1, &[word(1)]).unwrap();
        assert_ne!(picked[0], source);
        pool.accept_swapped_unit(&source, 50).unwrap();

        let entry = pool.reserved.iter().find(|r| r.mint == source).unwrap();
        assert_eq!(entry.unlock_at, 50 + DAY);
        assert!(pool.incoming.is_empty());
        assert_eq!(pool.reserved.len(), 2);
    }

    #[test]
    fn cancel_after_timeout_releases_promise() {
        let (mut pool, _) = pool();
        pool.lock_units(&units(2), 0).unwrap();
        let (id, _fee, burn) = pool.open_redeem(1).unwrap();
        let minted_before = pool.total_minted;

        let mut request = new_request(&Pubkey::new_unique(), id, RequestKind::Redeem, 1, 100);
        request.burned = burn;

        assert_err(request.cancel(100 + REQUEST_TIMEOUT_SECS - 1), PoolError::RequestNotExpired);
        request.cancel(100 + REQUEST_TIMEOUT_SECS).unwrap();
        assert_eq!(pool.cancel_request(&request).unwrap(), burn);

        assert_eq!(pool.pending_units, 0);
        assert_eq!(pool.total_minted, minted_before + burn);
        assert_eq!(request.status, RequestStatus::Cancelled);
        assert_err(request.cancel(200 + REQUEST_TIMEOUT_SECS), PoolError::UnknownRequest);
    }

    #[test]
    fn cancelled_swap_releases_source() {
        let (mut pool, _) = pool();
        pool.lock_units(&units(1), 0).unwrap();
        let source = Pubkey::new_unique();
        let id = pool.open_swap(&source).unwrap();

        let mut request = new_request(&Pubkey::new_unique(), id, RequestKind::Swap, 1, 0);
        request.source_unit = Some(source);
        request.cancel(REQUEST_TIMEOUT_SECS).unwrap();

        assert_eq!(pool.cancel_request(&request).unwrap(), 0);
        assert!(!pool.holds(&source));
        assert_eq!(pool.eligible_units(), 1);
    }
}
