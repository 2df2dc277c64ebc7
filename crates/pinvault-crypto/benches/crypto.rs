use pinvault_core::FileMetadata;
use pinvault_crypto::{derive_key, FileCipher, KdfParams};
use secrecy::SecretString;

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

fn metadata(size: usize) -> FileMetadata {
    FileMetadata::for_file("bench.bin", size as u64)
}

#[divan::bench]
fn bench_derive_key_default_params() {
    let password = SecretString::from("correct horse battery staple".to_string());
    derive_key(
        divan::black_box(&password),
        divan::black_box(&[0x5Au8; 16]),
        &KdfParams::default(),
    );
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt(bencher: divan::Bencher, size: usize) {
    let cipher = FileCipher::new(KdfParams { iterations: 1 });
    let password = SecretString::from("bench".to_string());
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            cipher
                .encrypt(divan::black_box(&data), &password, metadata(size))
                .unwrap()
        });
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_decrypt(bencher: divan::Bencher, size: usize) {
    let cipher = FileCipher::new(KdfParams { iterations: 1 });
    let password = SecretString::from("bench".to_string());
    let data = make_data(size);
    let encrypted = cipher.encrypt(&data, &password, metadata(size)).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            cipher
                .decrypt(divan::black_box(&encrypted.envelope), &password)
                .unwrap()
        });
}

fn main() {
    divan::main();
}
