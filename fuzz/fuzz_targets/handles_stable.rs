#![no_main]

use libfuzzer_sys::fuzz_target;

// Keys collide a lot on purpose, the index half checks stability.
fuzz_target!(|data: &[u8]| {
    let mut v: Vec<(u8, u32)> = data
        .iter()
        .enumerate()
        .map(|(i, &b)| (b % 16, i as u32))
        .collect();
    let mut expected = v.clone();
    expected.sort_by_key(|e| e.0);

    stride_sort::sort_handles_by(&mut v, |a: &(u8, u32), b: &(u8, u32)| a.0.cmp(&b.0)).unwrap();
    assert_eq!(v, expected);
});
