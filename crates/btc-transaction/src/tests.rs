//! Tests for the btc-transaction crate.
//!
//! Covers the input codecs, spend resolution across coin, witness and
//! script, and the wrapped witness script-hash cases.

use std::collections::{BTreeMap, HashMap, HashSet};

use btc_primitives::chainhash::Hash;
use btc_primitives::util::BtcReader;
use btc_script::opcodes::OP_0;
use btc_script::{Network, Script, ScriptType, Witness};

use crate::coin::Coin;
use crate::input::{
    Input, InputArg, InputOptions, MutableInput, SpendingInput, DEFAULT_SEQUENCE_NUMBER,
};
use crate::outpoint::{Outpoint, OutpointOptions, OUTPOINT_SIZE};
use crate::TransactionError;

// -----------------------------------------------------------------------
// Test vectors
// -----------------------------------------------------------------------

/// The single P2PKH input of a mainnet transaction.
const P2PKH_INPUT_RAW: &str = "38c7c61c14ffb063c3bb2664041a3e29ea6ea0412a0c18ff725ba4e9e12afae2030000006a47304402203e9ab8e4c14addf3b4741540b556cfb0e0efb67dc1a7b5ce84c3ac56b3fd447802203c9f49f7bd893ebd7060176dfc36bcaff9d2c443d9a0dd6cd2d59b372c024d20412102798913bc057b344de675dac34faafe3dc2f312c758cd9068209f810877306d66ffffffff";

const PREV_INTERNAL: &str = "38c7c61c14ffb063c3bb2664041a3e29ea6ea0412a0c18ff725ba4e9e12afae2";
const PREV_DISPLAY: &str = "e2fa2ae1e9a45b72ff180c2a41a06eea293e1a046426bbc363b0ff141cc6c738";

const SIG: &str = "304402203e9ab8e4c14addf3b4741540b556cfb0e0efb67dc1a7b5ce84c3ac56b3fd447802203c9f49f7bd893ebd7060176dfc36bcaff9d2c443d9a0dd6cd2d59b372c024d2041";
const KEY: &str = "02798913bc057b344de675dac34faafe3dc2f312c758cd9068209f810877306d66";
const PKH: &str = "eb0bd5edba389198e73f8efabddfc61666969ff7";

/// 2-of-2 multisig used as a witness script.
const WITNESS_SCRIPT: &str = "522102798913bc057b344de675dac34faafe3dc2f312c758cd9068209f810877306d662103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090d52ae";
const WITNESS_SCRIPT_SHA256: &str = "3d7495099f54098b5997885b48494a9cb61e5ba100a79ee60c00ed15e85be6f9";

fn bytes(h: &str) -> Vec<u8> {
    hex::decode(h).expect("valid hex")
}

fn prevout() -> Outpoint {
    Outpoint::new(Hash::from_internal_hex(PREV_INTERNAL).expect("valid hash"), 3)
}

fn push_script(items: &[Vec<u8>]) -> Script {
    let mut s = Script::new();
    for item in items {
        if item.is_empty() {
            s.append_opcodes(&[OP_0]).expect("opcode");
        } else {
            s.append_push_data(item).expect("push");
        }
    }
    s
}

fn pkh() -> [u8; 20] {
    let mut out = [0u8; 20];
    out.copy_from_slice(&bytes(PKH));
    out
}

fn wsh() -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes(WITNESS_SCRIPT_SHA256));
    out
}

fn coin_with(script: Script) -> Coin {
    Coin {
        version: 1,
        height: 500_000,
        value: 100_000,
        script,
        coinbase: false,
        hash: prevout().hash,
        index: 3,
    }
}

fn build(script: Script, witness: Witness, coin: Option<Coin>) -> Input {
    let mut input = MutableInput::new(prevout());
    input.script = script;
    input.witness = witness;
    input.coin = coin;
    input.finalize()
}

/// Witness for spending the 2-of-2 witness script.
fn multisig_witness() -> Witness {
    Witness::from_items(vec![vec![], bytes(SIG), bytes(SIG), bytes(WITNESS_SCRIPT)])
}

/// Signature script wrapping the witness script-hash program in P2SH.
fn wrapped_wsh_script() -> Script {
    push_script(&[Script::pay_to_witness_script_hash(&wsh()).to_bytes().to_vec()])
}

// -----------------------------------------------------------------------
// Raw codec
// -----------------------------------------------------------------------

/// Parse a real P2PKH input and re-serialize it byte for byte.
#[test]
fn test_raw_roundtrip_vector() {
    let input = Input::from_raw(&bytes(P2PKH_INPUT_RAW)).expect("should parse input");
    assert_eq!(input.prevout().hash.to_string(), PREV_DISPLAY);
    assert_eq!(input.prevout().index, 3);
    assert_eq!(input.sequence(), DEFAULT_SEQUENCE_NUMBER);
    assert_eq!(input.script().len(), 0x6a);
    assert!(input.witness().is_empty());
    assert_eq!(hex::encode(input.to_raw()), P2PKH_INPUT_RAW);
}

/// An empty script encodes as a single zero length byte between the
/// outpoint and the sequence.
#[test]
fn test_empty_script_layout() {
    let mut input = MutableInput::new(prevout());
    input.sequence = 0x0102_0304;
    let raw = input.to_raw();
    assert_eq!(raw.len(), OUTPOINT_SIZE + 1 + 4);
    assert_eq!(raw[OUTPOINT_SIZE], 0);
    assert_eq!(&raw[OUTPOINT_SIZE + 1..], &[0x04, 0x03, 0x02, 0x01]);
}

/// Truncated data and overlong length prefixes fail without a result.
#[test]
fn test_raw_truncated_fails() {
    let raw = bytes(P2PKH_INPUT_RAW);
    for len in [0, 10, 35, 36, 37, 100, raw.len() - 1] {
        assert!(
            matches!(
                Input::from_raw(&raw[..len]),
                Err(TransactionError::SerializationError(_))
            ),
            "length {} should fail",
            len
        );
    }

    // Script length prefix claims more bytes than remain.
    let mut overlong = prevout().to_bytes();
    overlong.extend_from_slice(&[0xfd, 0xff, 0x00, 0x01, 0x02]);
    assert!(Input::from_raw(&overlong).is_err());
}

/// The standalone decoder rejects trailing data; the cursor form does not.
#[test]
fn test_trailing_bytes() {
    let mut raw = bytes(P2PKH_INPUT_RAW);
    raw.push(0xaa);
    assert!(Input::from_raw(&raw).is_err());

    let mut reader = BtcReader::new(&raw);
    let input = Input::read_from(&mut reader).expect("should read");
    assert_eq!(input.prevout().index, 3);
    assert_eq!(reader.remaining(), 1);
}

// -----------------------------------------------------------------------
// Extended codec
// -----------------------------------------------------------------------

/// The extended form appends the witness stack to the raw form.
#[test]
fn test_extended_roundtrip() {
    let input = build(wrapped_wsh_script(), multisig_witness(), None);
    let raw = input.to_raw();
    let extended = input.to_extended();
    assert_eq!(&extended[..raw.len()], &raw[..]);
    assert_eq!(&extended[raw.len()..], &multisig_witness().to_bytes()[..]);

    let decoded = Input::from_extended(&extended).expect("should decode");
    assert_eq!(decoded, input);
    assert_eq!(decoded.witness().items(), multisig_witness().items());

    // The raw form drops the witness.
    let raw_only = Input::from_raw(&raw).expect("should decode");
    assert!(raw_only.witness().is_empty());
}

/// An input with an empty witness ends in a single zero count byte.
#[test]
fn test_extended_empty_witness() {
    let input = Input::from_raw(&bytes(P2PKH_INPUT_RAW)).unwrap();
    let extended = input.to_extended();
    assert_eq!(extended.len(), bytes(P2PKH_INPUT_RAW).len() + 1);
    assert_eq!(extended.last(), Some(&0));
    assert!(Input::from_extended(&extended[..extended.len() - 1]).is_err());
}

// -----------------------------------------------------------------------
// Options
// -----------------------------------------------------------------------

/// Omitted fields take their defaults.
#[test]
fn test_options_defaults() {
    let input = Input::from_options(InputOptions::new(OutpointOptions::from(prevout())))
        .expect("valid options");
    assert_eq!(input.sequence(), 4294967295);
    assert!(input.is_final());
    assert!(input.script().is_empty());
    assert!(input.witness().is_empty());
    assert!(input.coin().is_none());
}

/// Options given as JSON: sequence must be numeric when present.
#[test]
fn test_options_value() {
    let base = serde_json::json!({
        "prevout": { "hash": PREV_INTERNAL, "index": 3 },
        "script": "",
    });
    let input = Input::from_options_value(&base).expect("valid options");
    assert_eq!(input.prevout(), &prevout());
    assert!(input.is_final());

    let mut with_seq = base.clone();
    with_seq["sequence"] = serde_json::json!(7);
    let input = Input::from_options_value(&with_seq).expect("valid options");
    assert_eq!(input.sequence(), 7);
    assert!(!input.is_final());

    let mut bad_seq = base.clone();
    bad_seq["sequence"] = serde_json::json!("7");
    assert!(matches!(
        Input::from_options_value(&bad_seq),
        Err(TransactionError::InvalidOptions(_))
    ));

    assert!(matches!(
        Input::from_options_value(&serde_json::Value::Null),
        Err(TransactionError::InvalidOptions(_))
    ));

    let bad_hash = serde_json::json!({ "prevout": { "hash": "00", "index": 0 } });
    assert!(matches!(
        Input::from_options_value(&bad_hash),
        Err(TransactionError::InvalidOptions(_))
    ));
}

/// The tagged argument resolves either variant to an input.
#[test]
fn test_input_arg() {
    let built = Input::from_raw(&bytes(P2PKH_INPUT_RAW)).unwrap();
    let from_input = InputArg::from(built.clone()).into_input().unwrap();
    assert_eq!(from_input, built);

    let options = InputOptions {
        script: built.script().clone(),
        ..InputOptions::new(OutpointOptions::from(prevout()))
    };
    let from_options = InputArg::from(options).into_input().unwrap();
    assert_eq!(from_options, built);

    let bad = InputOptions::new(OutpointOptions {
        hash: "zz".to_string(),
        index: 0,
    });
    assert!(InputArg::Options(bad).into_input().is_err());
}

// -----------------------------------------------------------------------
// Coinbase
// -----------------------------------------------------------------------

/// Coinbase inputs resolve to nothing but their type.
#[test]
fn test_coinbase() {
    let mut input = MutableInput::new(Outpoint::null());
    input.script = Script::from_hex("033f250d").unwrap();
    let input = input.finalize();

    assert!(input.is_coinbase());
    assert_eq!(input.get_type(), ScriptType::Coinbase);
    assert!(input.get_address().is_none());
    assert!(input.get_redeem().is_none());
    assert!(input.get_subtype().is_none());
    assert!(input.get_hash().is_none());
    assert!(!input.test(&vec![PKH.to_string()]));
    assert!(!input.test(""));
}

// -----------------------------------------------------------------------
// Type and address resolution
// -----------------------------------------------------------------------

/// Without a coin, a P2PKH spend is recognised from its script.
#[test]
fn test_guess_pubkeyhash() {
    let input = Input::from_raw(&bytes(P2PKH_INPUT_RAW)).unwrap();
    assert_eq!(input.get_type(), ScriptType::Pubkeyhash);
    assert_eq!(input.get_hash_hex().as_deref(), Some(PKH));
    assert_eq!(
        input.get_address().unwrap().to_string(),
        "1NRoySJ9Lvby6DuE2UQYnyT67AASwNZxGb"
    );
    assert!(input.get_redeem().is_none());
    assert!(input.get_subtype().is_none());
}

/// A known coin wins over whatever the script looks like.
#[test]
fn test_coin_is_authoritative() {
    let garbled = Script::from_bytes(&[0x4c, 0xff, 0x00]);
    let coin = coin_with(Script::pay_to_pubkey_hash(&pkh()));
    let input = build(garbled.clone(), Witness::new(), Some(coin));
    assert_eq!(input.get_type(), ScriptType::Pubkeyhash);
    assert_eq!(input.get_hash_hex().as_deref(), Some(PKH));

    let guessed = build(garbled, Witness::new(), None);
    assert_eq!(guessed.get_type(), ScriptType::Unknown);
    assert!(guessed.get_address().is_none());
}

/// A witness key-hash spend resolves from the witness.
#[test]
fn test_witness_pubkeyhash() {
    let witness = Witness::from_items(vec![bytes(SIG), bytes(KEY)]);
    let input = build(Script::new(), witness, None);
    assert_eq!(input.get_type(), ScriptType::WitnessPubkeyhash);
    assert_eq!(input.get_hash_hex().as_deref(), Some(PKH));
    assert_eq!(
        input.get_address().unwrap().to_string(),
        "p2yFu8ZkV5SKukB7u5thEfFNqT7sVwgLx32x"
    );
}

/// An unrecognised witness falls back to the signature script.
#[test]
fn test_unknown_witness_falls_back_to_script() {
    let script = Input::from_raw(&bytes(P2PKH_INPUT_RAW)).unwrap().script().clone();
    let witness = Witness::from_items(vec![bytes(SIG)]);
    let input = build(script, witness, None);
    assert_eq!(input.get_type(), ScriptType::Pubkeyhash);
    assert_eq!(input.get_hash_hex().as_deref(), Some(PKH));
}

/// Native witness script-hash spend without a coin.
#[test]
fn test_native_witness_scripthash() {
    let input = build(Script::new(), multisig_witness(), None);
    assert_eq!(input.get_type(), ScriptType::WitnessScripthash);
    assert_eq!(input.get_hash_hex().as_deref(), Some(WITNESS_SCRIPT_SHA256));
    assert_eq!(input.get_redeem().unwrap().to_hex(), WITNESS_SCRIPT);
    assert_eq!(input.get_subtype(), Some(ScriptType::Multisig));
}

// -----------------------------------------------------------------------
// Redeem resolution
// -----------------------------------------------------------------------

/// P2SH wrapping a witness script hash resolves to the witness script.
#[test]
fn test_wrapped_witness_scripthash_redeem() {
    let input = build(wrapped_wsh_script(), multisig_witness(), None);
    assert_eq!(input.get_type(), ScriptType::WitnessScripthash);

    let redeem = input.get_redeem().expect("redeem resolves");
    assert_eq!(redeem.to_hex(), WITNESS_SCRIPT);
    assert!(!redeem.is_witness_scripthash());
    assert_eq!(input.get_subtype(), Some(ScriptType::Multisig));
}

/// Same spend with the P2SH coin known.
#[test]
fn test_wrapped_witness_scripthash_redeem_with_coin() {
    let program = Script::pay_to_witness_script_hash(&wsh());
    let mut p2sh_hash = [0u8; 20];
    p2sh_hash.copy_from_slice(&program.hash160());
    let coin = coin_with(Script::pay_to_script_hash(&p2sh_hash));

    let input = build(wrapped_wsh_script(), multisig_witness(), Some(coin));
    assert_eq!(input.get_type(), ScriptType::Scripthash);
    assert_eq!(
        input.get_address().unwrap().to_string(),
        "3A3PKjcGcoq4z3DFvhDg2YpoyU3iRR2Dnk"
    );
    assert_eq!(input.get_redeem().unwrap().to_hex(), WITNESS_SCRIPT);
    assert_eq!(input.get_subtype(), Some(ScriptType::Multisig));
}

/// P2SH wrapping a witness key hash keeps the program as redeem script.
#[test]
fn test_wrapped_witness_pubkeyhash() {
    let program = Script::pay_to_witness_pubkey_hash(&pkh());
    let script = push_script(&[program.to_bytes().to_vec()]);
    let witness = Witness::from_items(vec![bytes(SIG), bytes(KEY)]);
    let input = build(script, witness, None);

    assert_eq!(input.get_type(), ScriptType::WitnessPubkeyhash);
    assert_eq!(input.get_redeem(), Some(program));
    assert_eq!(input.get_subtype(), Some(ScriptType::WitnessPubkeyhash));
}

/// A plain P2SH multisig spend with the coin known.
#[test]
fn test_p2sh_redeem_with_coin() {
    let ws = Script::from_hex(WITNESS_SCRIPT).unwrap();
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&ws.hash160());
    let script = push_script(&[vec![], bytes(SIG), bytes(SIG), bytes(WITNESS_SCRIPT)]);
    let input = build(script, Witness::new(), Some(coin_with(Script::pay_to_script_hash(&hash))));

    assert_eq!(input.get_redeem(), Some(ws));
    assert_eq!(input.get_subtype(), Some(ScriptType::Multisig));
    assert_eq!(
        input.get_address().unwrap().to_string(),
        "3EFBiaNc44kJ6osWwsvaK4i1q3JaX8e3tE"
    );
}

/// Native witness script-hash coin resolves the redeem from the witness.
#[test]
fn test_native_wsh_coin_redeem() {
    let coin = coin_with(Script::pay_to_witness_script_hash(&wsh()));
    let input = build(Script::new(), multisig_witness(), Some(coin));
    assert_eq!(input.get_type(), ScriptType::WitnessScripthash);
    assert_eq!(input.get_redeem().unwrap().to_hex(), WITNESS_SCRIPT);
}

/// A coin that is neither P2SH nor witness script-hash has no redeem.
#[test]
fn test_plain_coin_has_no_redeem() {
    let coin = coin_with(Script::pay_to_pubkey_hash(&pkh()));
    let input = build(wrapped_wsh_script(), multisig_witness(), Some(coin));
    assert!(input.get_redeem().is_none());
    assert!(input.get_subtype().is_none());
}

// -----------------------------------------------------------------------
// Address set membership
// -----------------------------------------------------------------------

/// Every address-set shape matches on the hex hash.
#[test]
fn test_address_sets() {
    let input = Input::from_raw(&bytes(P2PKH_INPUT_RAW)).unwrap();
    let other = "00".repeat(20);

    assert!(input.test(PKH));
    assert!(!input.test(other.as_str()));
    assert!(input.test(&PKH.to_string()));

    assert!(input.test(&vec![other.clone(), PKH.to_string()]));
    assert!(!input.test(&vec![other.clone()]));
    assert!(input.test(&[PKH][..]));

    let set: HashSet<String> = [PKH.to_string()].into_iter().collect();
    assert!(input.test(&set));

    let mut map = HashMap::new();
    map.insert(PKH.to_string(), 1u32);
    assert!(input.test(&map));

    let mut tree = BTreeMap::new();
    tree.insert(other, ());
    assert!(!input.test(&tree));
}

/// Inputs with no resolvable address never match.
#[test]
fn test_no_address_never_matches() {
    let input = build(Script::new(), Witness::new(), None);
    assert!(input.get_address().is_none());
    assert!(!input.test(&vec![PKH.to_string(), String::new()]));
}

// -----------------------------------------------------------------------
// Mutable and finalized forms
// -----------------------------------------------------------------------

/// The builder recomputes after edits; finalized values cache.
#[test]
fn test_mutable_recomputes() {
    let mut input = MutableInput::new(prevout());
    assert_eq!(input.get_type(), ScriptType::Unknown);

    input.witness = Witness::from_items(vec![bytes(SIG), bytes(KEY)]);
    assert_eq!(input.get_type(), ScriptType::WitnessPubkeyhash);

    let frozen = input.clone().finalize();
    assert_eq!(frozen.get_type(), ScriptType::WitnessPubkeyhash);
    assert_eq!(frozen.get_type(), ScriptType::WitnessPubkeyhash);
    assert_eq!(frozen.get_hash_hex().as_deref(), Some(PKH));

    let mut thawed = frozen.into_mutable();
    assert_eq!(thawed, input);
    thawed.witness = Witness::new();
    assert_eq!(thawed.finalize().get_type(), ScriptType::Unknown);
}

/// Both forms serialize identically.
#[test]
fn test_forms_serialize_alike() {
    let input = Input::from_raw(&bytes(P2PKH_INPUT_RAW)).unwrap();
    let mutable = MutableInput::from(input.clone());
    assert_eq!(mutable.to_raw(), input.to_raw());
    assert_eq!(mutable.to_json(), input.to_json());
}

// -----------------------------------------------------------------------
// JSON
// -----------------------------------------------------------------------

/// JSON carries display-order hashes and the resolved address.
#[test]
fn test_json_shape() {
    let input = Input::from_raw(&bytes(P2PKH_INPUT_RAW)).unwrap();
    let json = serde_json::to_value(&input).unwrap();
    assert_eq!(json["prevout"]["hash"], PREV_DISPLAY);
    assert_eq!(json["prevout"]["index"], 3);
    assert_eq!(json["coin"], serde_json::Value::Null);
    assert_eq!(json["script"], hex::encode(input.script().to_bytes()));
    assert_eq!(json["witness"], serde_json::json!([]));
    assert_eq!(json["sequence"], 4294967295u32);
    assert_eq!(json["address"], "1NRoySJ9Lvby6DuE2UQYnyT67AASwNZxGb");

    let testnet = input.to_json_for(Network::Testnet);
    assert_eq!(
        testnet.address.as_deref(),
        Some("n2wmGVP89x3DsLNqk3NvctfQy9m9pvt7mk")
    );
}

/// JSON round trip keeps the coin, script and witness.
#[test]
fn test_json_roundtrip_with_coin() {
    let coin = coin_with(Script::pay_to_witness_script_hash(&wsh()));
    let input = build(Script::new(), multisig_witness(), Some(coin));
    let text = serde_json::to_string(&input).unwrap();
    let back = Input::from_json_str(&text).expect("should parse");
    assert_eq!(back, input);
    assert_eq!(back.coin().unwrap().value, 100_000);
}

/// JSON without a numeric sequence is rejected.
#[test]
fn test_json_requires_sequence() {
    let input = Input::from_raw(&bytes(P2PKH_INPUT_RAW)).unwrap();
    let mut json = serde_json::to_value(&input).unwrap();

    json["sequence"] = serde_json::json!("4294967295");
    assert!(matches!(
        Input::from_json(&json),
        Err(TransactionError::InvalidJson(_))
    ));

    json.as_object_mut().unwrap().remove("sequence");
    assert!(Input::from_json(&json).is_err());

    assert!(Input::from_json(&serde_json::Value::Null).is_err());
    assert!(matches!(
        Input::from_json_str("{not json"),
        Err(TransactionError::Json(_))
    ));
}

/// Prevout hash text is accepted in either case.
#[test]
fn test_json_prevout_case_insensitive() {
    let input = Input::from_raw(&bytes(P2PKH_INPUT_RAW)).unwrap();
    let mut json = serde_json::to_value(&input).unwrap();
    json["prevout"]["hash"] = serde_json::json!(PREV_DISPLAY.to_uppercase());
    assert_eq!(Input::from_json(&json).unwrap(), input);
}

// -----------------------------------------------------------------------
// Inspection
// -----------------------------------------------------------------------

/// Without a coin, inspection shows a placeholder coin.
#[test]
fn test_inspect_placeholder() {
    let input = Input::from_raw(&bytes(P2PKH_INPUT_RAW)).unwrap();
    let view = serde_json::to_value(input.inspect()).unwrap();
    assert_eq!(view["type"], "pubkeyhash");
    assert_eq!(view["subtype"], serde_json::Value::Null);
    assert_eq!(view["value"], "0.0");
    assert_eq!(view["address"], "1NRoySJ9Lvby6DuE2UQYnyT67AASwNZxGb");
    assert_eq!(view["coin"]["type"], "unknown");
    assert_eq!(view["coin"]["version"], 1);
    assert_eq!(view["coin"]["height"], -1);
    assert_eq!(view["coin"]["value"], "0.0");
    assert_eq!(view["coin"]["script"], "");
    assert_eq!(view["coin"]["coinbase"], false);
    assert_eq!(view["coin"]["hash"], PREV_DISPLAY);
    assert_eq!(view["coin"]["index"], 3);
    assert_eq!(view["coin"]["age"], 0);
    assert_eq!(view["coin"]["address"], serde_json::Value::Null);
}

/// With a coin, inspection reports its value and redeem details.
#[test]
fn test_inspect_with_coin() {
    let coin = coin_with(Script::pay_to_witness_script_hash(&wsh()));
    let input = build(Script::new(), multisig_witness(), Some(coin));
    let view = input.inspect();
    assert_eq!(view.kind, ScriptType::WitnessScripthash);
    assert_eq!(view.subtype, Some(ScriptType::Multisig));
    assert_eq!(view.value, "0.001");
    assert_eq!(view.redeem.map(|r| r.to_hex()).as_deref(), Some(WITNESS_SCRIPT));

    let json = serde_json::to_value(input.inspect()).unwrap();
    assert_eq!(json["coin"]["value"], "0.001");
    assert_eq!(json["coin"]["height"], 500_000);
}
