//! Long polling support for the `getBlockTemplate` RPC.
//!
//! These implementation details are private, and should not be relied upon
//! by miners: the ID is an opaque resume token.

use std::{fmt, str::FromStr};

use okapi_chain::block;
use okapi_dag::BoxError;

/// The inputs that identify a block template held by a miner.
///
/// An ID is minted with every successful template reply. When a miner sends
/// it back, the service compares the fields against the in-force template
/// and either replies immediately (the template is already stale) or parks
/// the request until one of them changes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LongPollId {
    /// The DAG tips the template was built on.
    ///
    /// If the tips change, a new template must be provided. Old work is no
    /// longer valid.
    pub tip_hashes: Vec<block::Hash>,

    /// The pay address the template's coinbase pays to, as supplied in the
    /// request that minted this ID.
    pub pay_address: String,

    /// The time the template was generated, in whole seconds since the Unix
    /// epoch.
    pub last_generated: i64,
}

impl LongPollId {
    /// Returns a new [`LongPollId`], based on the supplied fields.
    pub fn new(tip_hashes: Vec<block::Hash>, pay_address: String, last_generated: i64) -> Self {
        LongPollId {
            tip_hashes,
            pay_address,
            last_generated,
        }
    }
}

impl fmt::Display for LongPollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hash in &self.tip_hashes {
            write!(f, "{hash}")?;
        }
        write!(f, "-{}-{}", self.pay_address, self.last_generated)
    }
}

impl FromStr for LongPollId {
    type Err = BoxError;

    /// Exact conversion from a string to a [`LongPollId`].
    ///
    /// Parse failures are recoverable: the caller treats the ID as stale and
    /// returns the current template instead of failing the RPC.
    fn from_str(long_poll_id: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = long_poll_id.split('-').collect();
        let &[tip_hashes_str, pay_address, last_generated_str] = fields.as_slice() else {
            return Err("incorrect long poll id field count, must be 3".into());
        };

        if tip_hashes_str.is_empty()
            || !tip_hashes_str.is_ascii()
            || tip_hashes_str.len() % block::Hash::HEX_WIDTH != 0
        {
            return Err("tip hashes are not a sequence of whole hashes".into());
        }
        let tip_hashes = tip_hashes_str
            .as_bytes()
            .chunks(block::Hash::HEX_WIDTH)
            .map(|chunk| {
                let chunk = std::str::from_utf8(chunk).expect("whole chunks of an ASCII string");
                chunk.parse()
            })
            .collect::<Result<Vec<block::Hash>, _>>()?;

        let last_generated = last_generated_str.parse()?;

        Ok(LongPollId {
            tip_hashes,
            pay_address: pay_address.to_string(),
            last_generated,
        })
    }
}

/// Check that an ID freshly minted by the service is accepted by its own
/// parser and identifies the same template.
///
/// The codec is only useful if every reply's ID resumes correctly, so this
/// is the load-bearing conformance check for the wire format.
#[test]
fn long_poll_id_round_trips_through_the_wire_format() {
    use okapi_chain::{address::Address, parameters::Network};

    let tip_hashes = vec![block::Hash([17; 32]), block::Hash([255; 32])];
    let pay_address = Address::new(Network::Mainnet, [3; 32]).to_string();
    let id = LongPollId::new(tip_hashes.clone(), pay_address.clone(), 1_700_000_123);

    let encoded = id.to_string();
    let decoded: LongPollId = encoded.parse().expect("freshly minted IDs parse");

    assert_eq!(decoded.tip_hashes, tip_hashes);
    assert_eq!(decoded.pay_address, pay_address);
    assert_eq!(decoded.last_generated, 1_700_000_123);
}

/// IDs from older or foreign miner software must not take the error path of
/// the RPC; the parser just reports failure and the caller falls back.
#[test]
fn malformed_long_poll_ids_are_rejected() {
    assert!("".parse::<LongPollId>().is_err());
    assert!("only-two".parse::<LongPollId>().is_err());
    assert!("one-two-three-four".parse::<LongPollId>().is_err());
    // hash field is not a multiple of the hash hex width
    assert!("abcd-okapi1qqq-17".parse::<LongPollId>().is_err());
    // non-integer timestamp
    let hashes = "11".repeat(32);
    assert!(format!("{hashes}-okapi1qqq-xyz").parse::<LongPollId>().is_err());
}
