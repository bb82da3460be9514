macro_rules! test_compress {
    ($name: ident, $type: ty, $value: expr) => {
        #[test]
        fn $name() {
            let value: $type = $value;
            let bytes = <$type as $crate::Compress>::to_bytes(&value);

            assert_eq!(
                bytes.as_ref().len(),
                <$type as $crate::Compress>::OUTPUT_SIZE
            );
            assert_eq!(
                value,
                <$type as $crate::Compress>::from_bytes(&bytes).unwrap()
            );

            let hex = <$type as $crate::Compress>::to_hex(&value);
            assert_eq!(hex.len(), 2 * <$type as $crate::Compress>::OUTPUT_SIZE);
            assert_eq!(
                value,
                <$type as $crate::Compress>::from_hex(&hex.to_lowercase()).unwrap()
            );
            assert!(<$type as $crate::Compress>::from_hex(&hex[2..]).is_err());
        }
    };
}
