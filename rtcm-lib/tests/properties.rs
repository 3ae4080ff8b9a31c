mod common;

use common::msm7_payload;
use proptest::prelude::*;
use rtcm3::bits::BitCursor;
use rtcm3::framing::{crc24q, frame, FrameExtractor, RawFrame, CRC_LEN, HEADER_LEN};
use rtcm3::messages::{Decode, Fields, Msm7};

fn extract_all(chunks: &[&[u8]]) -> Vec<RawFrame> {
    let mut extractor = FrameExtractor::new();
    let mut frames = Vec::default();
    for chunk in chunks {
        extractor.push(chunk);
        frames.extend(std::iter::from_fn(|| extractor.next_frame()));
    }
    extractor.finish();
    frames.extend(std::iter::from_fn(|| extractor.next_frame()));
    frames
}

proptest! {
    #[test]
    fn prop_frame_length_and_checksum(payload in prop::collection::vec(any::<u8>(), 0..=1023)) {
        let dat = frame(&payload).unwrap();
        prop_assert_eq!(dat.len(), HEADER_LEN + payload.len() + CRC_LEN);

        let frames = extract_all(&[&dat]);
        prop_assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        prop_assert_eq!(usize::from(frame.declared_length), payload.len());
        prop_assert_eq!(&frame.payload, &payload);

        let crc = crc24q(&dat[..dat.len() - CRC_LEN]);
        prop_assert_eq!(&crc.to_be_bytes()[1..], &dat[dat.len() - CRC_LEN..]);
    }

    #[test]
    fn prop_single_bit_flip_is_rejected(
        payload in prop::collection::vec(any::<u8>(), 1..256),
        bit in any::<prop::sample::Index>(),
    ) {
        let mut dat = frame(&payload).unwrap();
        // any bit of the payload or CRC
        let flip = HEADER_LEN * 8 + bit.index((dat.len() - HEADER_LEN) * 8);
        dat[flip / 8] ^= 0x80 >> (flip % 8);

        let frames = extract_all(&[&dat]);
        prop_assert!(frames.iter().all(|f| f.offset != 0), "corrupted frame was accepted");
    }

    #[test]
    fn prop_chunking_does_not_change_frames(
        payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 2..64), 1..16),
        noise in prop::collection::vec(any::<u8>(), 0..64),
        chunk_size in 1usize..50,
    ) {
        let mut dat = noise.clone();
        for payload in &payloads {
            dat.extend(frame(payload).unwrap());
        }

        let bulk = extract_all(&[&dat]);
        let chunks: Vec<&[u8]> = dat.chunks(chunk_size).collect();
        let chunked = extract_all(&chunks);
        prop_assert_eq!(&bulk, &chunked);

        // every genuine frame is found regardless of the noise before it
        for payload in &payloads {
            prop_assert!(bulk.iter().any(|f| &f.payload == payload));
        }
    }

    #[test]
    fn prop_signed_reads_match_unsigned(dat in prop::collection::vec(any::<u8>(), 8), width in 1u8..=64) {
        let raw = BitCursor::new(&dat).read_uint(width).unwrap();
        let signed = BitCursor::new(&dat).read_int(width).unwrap();

        if raw >> (width - 1) & 1 == 1 {
            prop_assert!(signed < 0);
            let mask = u64::MAX >> (64 - u32::from(width));
            prop_assert_eq!(signed as u64 & mask, raw);
        } else {
            prop_assert_eq!(signed as u64, raw);
        }
    }

    #[test]
    fn prop_msm7_mask_counts(
        satellite_mask in any::<u64>(),
        signal_mask in any::<u32>(),
        seed in any::<u64>(),
    ) {
        let nsat = satellite_mask.count_ones() as usize;
        let nsig = signal_mask.count_ones() as usize;
        let cells: Vec<bool> = (0..nsat * nsig).map(|i| (seed >> (i % 64)) & 1 == 1).collect();
        let payload = msm7_payload(1077, satellite_mask, signal_mask, &cells);

        let mut cur = BitCursor::new(&payload);
        let msg = Msm7::decode(&mut Fields::new(&mut cur, 1077)).unwrap();

        prop_assert_eq!(msg.satellites.len(), nsat);
        prop_assert_eq!(msg.signals.len(), nsig);
        prop_assert_eq!(msg.cell_mask.len(), nsat * nsig);
        prop_assert_eq!(cur.position(), Msm7::bit_len(nsat, nsig));
        prop_assert!(cur.remaining() < 8);
        prop_assert_eq!(msg.cells().filter(|c| c.2).count(), cells.iter().filter(|c| **c).count());

        let short = &payload[..payload.len() - 1];
        let mut cur = BitCursor::new(short);
        prop_assert!(Msm7::decode(&mut Fields::new(&mut cur, 1077)).is_err());
    }
}
