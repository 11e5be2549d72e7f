use proptest::prelude::*;

use btc_primitives::amount::{from_btc, to_btc, MAX_SAFE_AMOUNT};
use btc_primitives::chainhash::Hash;
use btc_primitives::util::{BtcReader, BtcWriter, VarInt};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn hash_display_and_internal_hex_agree(bytes in prop::array::uniform32(any::<u8>())) {
        let hash = Hash::new(bytes);
        let display = Hash::from_hex(&hash.to_string()).unwrap();
        let internal = Hash::from_internal_hex(&hash.to_internal_hex()).unwrap();
        prop_assert_eq!(display, hash);
        prop_assert_eq!(internal, hash);

        let mut reversed = bytes;
        reversed.reverse();
        prop_assert_eq!(hash.to_string(), hex::encode(reversed));
    }

    #[test]
    fn varint_decodes_what_it_encodes(value in any::<u64>()) {
        let mut writer = BtcWriter::new();
        writer.write_varint(VarInt(value));
        let bytes = writer.into_bytes();
        prop_assert_eq!(bytes.len(), VarInt(value).length());

        let mut reader = BtcReader::new(&bytes);
        prop_assert_eq!(reader.read_varint().unwrap().value(), value);
        prop_assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn var_bytes_truncation_is_rejected(data in prop::collection::vec(any::<u8>(), 1..300)) {
        let mut writer = BtcWriter::new();
        writer.write_var_bytes(&data);
        let bytes = writer.into_bytes();

        let truncated = &bytes[..bytes.len() - 1];
        let mut reader = BtcReader::new(truncated);
        prop_assert!(reader.read_var_bytes().is_err());
        prop_assert_eq!(reader.remaining(), truncated.len());
    }

    #[test]
    fn btc_amount_text_is_lossless(value in 0u64..=MAX_SAFE_AMOUNT) {
        prop_assert_eq!(from_btc(&to_btc(value)).unwrap(), value);
    }
}
