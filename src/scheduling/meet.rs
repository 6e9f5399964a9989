use rand::Rng;

const MEET_BASE: &str = "https://meet.google.com";

fn lowercase_run<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

/// Placeholder video link for online appointments, e.g.
/// `https://meet.google.com/abc-defg-hij`. Not checked for uniqueness.
pub fn generate_meet_link() -> String {
    let mut rng = rand::thread_rng();
    format!(
        "{}/{}-{}-{}",
        MEET_BASE,
        lowercase_run(&mut rng, 3),
        lowercase_run(&mut rng, 4),
        lowercase_run(&mut rng, 3)
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use lazy_static::lazy_static;
    use regex::Regex;

    use super::*;

    lazy_static! {
        pub(crate) static ref MEET_LINK_RE: Regex =
            Regex::new(r"^https://meet\.google\.com/[a-z]{3}-[a-z]{4}-[a-z]{3}$").unwrap();
    }

    #[test]
    fn link_has_three_lowercase_segments() {
        for _ in 0..100 {
            let link = generate_meet_link();
            assert!(MEET_LINK_RE.is_match(&link), "bad link {link}");
        }
    }

    #[test]
    fn links_vary() {
        let a = generate_meet_link();
        let b = generate_meet_link();
        let c = generate_meet_link();
        assert!(a != b || b != c);
    }
}
