#![no_main]

use libfuzzer_sys::fuzz_target;

// The first byte picks the stride, the rest is records. Records compare by their first byte
// only, so equal keys with different tails are common.
fuzz_target!(|data: &[u8]| {
    let Some((&stride, rest)) = data.split_first() else {
        return;
    };
    let stride = stride.max(1);
    let len = rest.len() - rest.len() % stride as usize;
    let mut v = rest[..len].to_vec();

    let mut expected: Vec<&[u8]> = rest[..len].chunks(stride as usize).collect();
    expected.sort_by_key(|r| r[0]);

    stride_sort::sort_inline_by(&mut v, stride, |a: &[u8], b: &[u8]| a[0].cmp(&b[0])).unwrap();
    assert_eq!(v, expected.concat());
});
