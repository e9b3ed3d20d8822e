// Topic modeling: vocabulary construction, the model trait seam, and the
// default LDA implementation.

pub mod lda;
pub mod special;
pub mod traits;
pub mod vocabulary;
