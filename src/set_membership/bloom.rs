use crate::bloom::BloomFilter;
use crate::set_membership::SetMembership;
use sha2::Digest;

impl<H1, H2, I> SetMembership<I> for BloomFilter<H1, H2>
where
    H1: Digest,
    H2: Digest,
    I: AsRef<[u8]> + ?Sized,
{
    fn contains(&self, item: &I) -> bool {
        BloomFilter::contains(self, item)
    }

    fn insert(&mut self, item: &I) {
        self.add(item)
    }
}
