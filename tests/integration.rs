use aont::{transform, untransform, AontError, HashAlgorithm, KeySize, Params, PartReader, PartWriter};
use proptest::prelude::*;
use std::error::Error;
use std::fs;
use std::io::{Cursor, Read, Write};
use tempfile::tempdir;

fn sample_data(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 131 % 256) as u8).collect()
}

fn transformed(data: &[u8], params: &Params) -> Vec<u8> {
    let mut out = Vec::new();
    transform(&mut Cursor::new(data), &mut out, params).unwrap();
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn roundtrip_any_plaintext(data in proptest::collection::vec(any::<u8>(), 0..3000)) {
        let params = Params::default();
        let package = transformed(&data, &params);
        prop_assert_eq!(package.len() as u64, params.transformed_len(data.len() as u64));

        let mut restored = Vec::new();
        untransform(&mut Cursor::new(&package), &mut restored, &params).unwrap();
        prop_assert_eq!(restored, data);
    }
}

#[test]
fn split_join_is_inverse_over_grid() -> Result<(), Box<dyn Error>> {
    let stream = transformed(&sample_data(2000), &Params::default());
    let len = stream.len() as u64;

    for number in [1usize, 2, 5, 17] {
        for size in [1u64, 128, 4096] {
            let dir = tempdir()?;
            let template = dir.path().join("part.*");
            let mut writer = PartWriter::new(template.to_str().unwrap(), number, size)?;
            // Same write pattern as the engine: IV, ciphertext chunks, key
            let body_end = stream.len() - 32;
            writer.write_all(&stream[..16])?;
            for chunk in stream[16..body_end].chunks(700) {
                writer.write_all(chunk)?;
            }
            writer.write_all(&stream[body_end..])?;
            let parts = writer.finish()?;

            let expected_files = (number as u64).min(len.div_ceil(size)) as usize;
            assert_eq!(
                parts.len(),
                expected_files,
                "file count for number={} size={}",
                number,
                size
            );
            assert_eq!(fs::read_dir(dir.path())?.count(), expected_files);

            for path in &parts[..parts.len() - 1] {
                assert_eq!(fs::metadata(path)?.len(), size);
            }

            let mut joined = Vec::new();
            PartReader::open(&parts)?.read_to_end(&mut joined)?;
            assert_eq!(joined, stream, "join mismatch for number={} size={}", number, size);
        }
    }

    Ok(())
}

#[test]
fn transform_through_parts_and_back() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let data = sample_data(200_000);

    for params in [
        Params::default(),
        Params::new(KeySize::Aes128, HashAlgorithm::Blake3),
        Params::new(KeySize::Aes192, HashAlgorithm::Sha512),
    ] {
        let template = dir.path().join(format!("{}-{{}}", params.key_size));
        let size = params.estimate_part_size(data.len() as u64, 7)?;
        let mut writer = PartWriter::new(template.to_str().unwrap(), 7, size)?;
        transform(&mut Cursor::new(&data), &mut writer, &params)?;
        let parts = writer.finish()?;
        assert_eq!(parts.len(), 7);

        let mut reader = PartReader::open(&parts)?;
        let mut restored = Vec::new();
        let summary = untransform(&mut reader, &mut restored, &params)?;
        assert_eq!(summary.plaintext_bytes, data.len() as u64);
        assert_eq!(restored, data);
    }

    Ok(())
}

#[test]
fn capped_parts_absorb_overflow_and_reverse() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let params = Params::default();
    let data = sample_data(1000);

    let template = dir.path().join("capped*");
    let mut writer = PartWriter::new(template.to_str().unwrap(), 2, 10)?;
    transform(&mut Cursor::new(&data), &mut writer, &params)?;
    let parts = writer.finish()?;
    assert_eq!(parts.len(), 2);
    assert_eq!(fs::metadata(&parts[0])?.len(), 10);
    assert_eq!(fs::metadata(&parts[1])?.len(), params.transformed_len(1000) - 10);

    let mut restored = Vec::new();
    untransform(&mut PartReader::open(&parts)?, &mut restored, &params)?;
    assert_eq!(restored, data);

    Ok(())
}

#[test]
fn partial_parts_are_useless() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let params = Params::default();
    let data = sample_data(10_000);

    let template = dir.path().join("chunk{}");
    let size = params.estimate_part_size(data.len() as u64, 3)?;
    let mut writer = PartWriter::new(template.to_str().unwrap(), 3, size)?;
    transform(&mut Cursor::new(&data), &mut writer, &params)?;
    let parts = writer.finish()?;
    assert_eq!(parts.len(), 3);

    let subsets = [
        vec![parts[0].clone(), parts[2].clone()],
        vec![parts[0].clone(), parts[1].clone()],
        vec![parts[1].clone(), parts[2].clone()],
    ];
    for subset in &subsets {
        let mut reader = PartReader::open(subset)?;
        let mut restored = Vec::new();
        let result = untransform(&mut reader, &mut restored, &params);
        assert!(
            matches!(result, Err(AontError::Integrity) | Err(AontError::Format(_))),
            "partial set must be rejected, got {:?}",
            result
        );
        assert!(restored.is_empty(), "rejected reversal wrote plaintext");
    }

    Ok(())
}

#[test]
fn misordered_parts_never_yield_plaintext() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let params = Params::default();
    let data = sample_data(8_192);

    // Block-aligned parts keep the length valid, so only the hash catches it
    let template = dir.path().join("seg*");
    let mut writer = PartWriter::new(template.to_str().unwrap(), 0, 2048)?;
    transform(&mut Cursor::new(&data), &mut writer, &params)?;
    let mut parts = writer.finish()?;
    parts.swap(1, 2);

    let mut reader = PartReader::open(&parts)?;
    let mut restored = Vec::new();
    match untransform(&mut reader, &mut restored, &params) {
        Err(AontError::Integrity) => assert!(restored.is_empty()),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => assert_ne!(restored, data),
    }

    Ok(())
}
