//! This file produces a binary that prints the sizes of the SM9 artifacts
//! such as the MPK, MSK, USK, CT and signatures.

use sm9::kgc::{self, MasterPublicKey, Usage};
use sm9::pke::{self, Mode};
use sm9::sign;
use sm9::Compress;

const ID: &[u8] = b"alice";
const MSG: &[u8] = b"hello world!!";

/// Prints the sizes of a master key pair and a user key extracted under it.
macro_rules! print_sizes_master {
    ($label: expr, $setup: path, $variant: ident, $usage: expr) => {{
        let mut rng = rand::thread_rng();

        let master = $setup(&mut rng);
        let usk = kgc::extract_usk(&master.secret, ID, $usage).unwrap();

        println!("{}", $label);
        println!("MPK:\t{}", MasterPublicKey::$variant(master.public.clone()).to_vec().len());
        println!("MSK:\t{}", master.secret.to_bytes().len());
        println!("USK:\t{}", usk.to_vec().len());

        master
    }};
}

fn main() {
    println!("SM9 sizes in bytes:\n");

    let master = print_sizes_master!("encryption", kgc::setup_encrypt, Encrypt, Usage::Encrypt);
    let mut rng = rand::thread_rng();
    for mode in [Mode::Stream, Mode::Block] {
        let ct = pke::encrypt(&master.public, ID, MSG, mode, &mut rng).unwrap();
        println!("CT ({:?}, {} byte message):\t{}", mode, MSG.len(), ct.to_vec().len());
    }
    println!();

    let master = print_sizes_master!("signature", kgc::setup_sign, Sign, Usage::Sign);
    let usk = kgc::extract_usk(&master.secret, ID, Usage::Sign).unwrap();
    let sig = sign::sign(&master.public, &usk, MSG, &mut rng).unwrap();
    println!("SIG:\t{}\n", sig.to_bytes().len());

    print_sizes_master!("exchange", kgc::setup_encrypt, Encrypt, Usage::Exchange);
}
