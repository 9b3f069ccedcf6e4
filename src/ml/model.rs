use burn::{
    module::{Ignored, Param},
    nn::{Dropout, DropoutConfig, Embedding, EmbeddingConfig, Initializer, Linear, LinearConfig},
    prelude::*,
    tensor::activation::log_softmax,
};
use thiserror::Error;

use crate::data::batcher::Seq2SeqBatch;
use crate::domain::vocabulary::{SpecialToken, Vocabulary, EOS_ID, PAD_ID, SOS_ID};
use crate::ml::rnn::{CombineMethod, RnnDecoder, RnnEncoder, RnnState, RnnType};

/// Candidates retrieved per decoding step; only the best one is used.
const TOP_K: usize = 4;

#[derive(Error, Debug, PartialEq)]
pub enum ModelError {
    #[error("Invalid model configuration: {0}")]
    InvalidConfig(String),
}

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct RnnEncDecConfig {
    pub source_vocab_size: usize,
    pub target_vocab_size: usize,
    #[config(default = 128)]
    pub embedding_size: usize,
    #[config(default = 256)]
    pub hidden_size: usize,
    #[config(default = 2)]
    pub num_layers: usize,
    #[config(default = "RnnType::Lstm")]
    pub rnn_type: RnnType,
    #[config(default = true)]
    pub bidirectional: bool,
    #[config(default = "CombineMethod::Concat")]
    pub combine_method: CombineMethod,
    #[config(default = 0.3)]
    pub dropout_ratio: f64,
}

impl RnnEncDecConfig {
    /// Reject sizes that would only fail later as a tensor shape mismatch.
    pub fn validate(&self) -> Result<(), ModelError> {
        let reserved = SpecialToken::ALL.len();
        if self.source_vocab_size < reserved || self.target_vocab_size < reserved {
            return Err(ModelError::InvalidConfig(format!(
                "vocabularies need at least the {reserved} reserved tokens (source {}, target {})",
                self.source_vocab_size, self.target_vocab_size
            )));
        }
        if self.embedding_size == 0 || self.hidden_size == 0 || self.num_layers == 0 {
            return Err(ModelError::InvalidConfig(
                "embedding_size, hidden_size and num_layers must be positive".to_string(),
            ));
        }
        if self.bidirectional
            && self.combine_method == CombineMethod::Concat
            && self.hidden_size % 2 != 0
        {
            return Err(ModelError::InvalidConfig(format!(
                "concat of two directions needs an even hidden_size, got {}",
                self.hidden_size
            )));
        }
        if !(0.0..1.0).contains(&self.dropout_ratio) {
            return Err(ModelError::InvalidConfig(format!(
                "dropout_ratio must be in [0, 1), got {}",
                self.dropout_ratio
            )));
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> RnnEncDec<B> {
        let source_embedder = TokenEmbedder::new(self.source_vocab_size, self.embedding_size, device);
        let target_embedder = TokenEmbedder::new(self.target_vocab_size, self.embedding_size, device);
        let encoder = RnnEncoder::new(
            self.rnn_type,
            self.embedding_size,
            self.hidden_size,
            self.num_layers,
            self.bidirectional,
            self.combine_method,
            device,
        );
        let decoder = RnnDecoder::new(
            self.rnn_type,
            self.embedding_size,
            self.hidden_size,
            self.num_layers,
            device,
        );
        let vocab_linear = LinearConfig::new(self.hidden_size, self.target_vocab_size)
            .with_initializer(Initializer::XavierNormal { gain: 1.0 })
            .init(device);
        let dropout = DropoutConfig::new(self.dropout_ratio).init();
        RnnEncDec {
            source_embedder, target_embedder, encoder, decoder, vocab_linear, dropout,
            rnn_type:          Ignored(self.rnn_type),
            num_layers:        self.num_layers,
            hidden_size:       self.hidden_size,
            target_vocab_size: self.target_vocab_size,
        }
    }
}

/// Embedding whose padding row is zero and never receives gradient:
/// outputs at padding positions are multiplied by zero.
#[derive(Module, Debug)]
pub struct TokenEmbedder<B: Backend> {
    embedding: Embedding<B>,
}

impl<B: Backend> TokenEmbedder<B> {
    pub fn new(vocab_size: usize, embedding_size: usize, device: &B::Device) -> Self {
        let mut embedding = EmbeddingConfig::new(vocab_size, embedding_size).init(device);
        // Xavier needs both fans, which EmbeddingConfig does not pass on.
        let weight: Param<Tensor<B, 2>> = Initializer::XavierNormal { gain: 1.0 }.init_with(
            [vocab_size, embedding_size],
            Some(vocab_size),
            Some(embedding_size),
            device,
        );
        embedding.weight = weight.map(|w| {
            let device = w.device();
            w.slice_assign([PAD_ID..PAD_ID + 1, 0..embedding_size], Tensor::zeros([1, embedding_size], &device))
                .detach()
                .require_grad()
        });
        Self { embedding }
    }

    /// ids [batch, steps] → [batch, steps, embedding]
    pub fn forward(&self, ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let [batch, steps] = ids.dims();
        let keep = ids.clone().not_equal_elem(PAD_ID as i32).float().unsqueeze_dim::<3>(2);
        let embedded = self.embedding.forward(ids);
        let [_, _, width] = embedded.dims();
        embedded * keep.expand([batch, steps, width])
    }
}

#[derive(Module, Debug)]
pub struct RnnEncDec<B: Backend> {
    pub source_embedder:   TokenEmbedder<B>,
    pub target_embedder:   TokenEmbedder<B>,
    pub encoder:           RnnEncoder<B>,
    pub decoder:           RnnDecoder<B>,
    pub vocab_linear:      Linear<B>,
    pub dropout:           Dropout,
    pub rnn_type:          Ignored<RnnType>,
    pub num_layers:        usize,
    pub hidden_size:       usize,
    pub target_vocab_size: usize,
}

impl<B: Backend> RnnEncDec<B> {
    /// Shifted-target cross-entropy with teacher forcing.
    ///
    /// decoder input = target[:, :-1], prediction target = target[:, 1:]
    pub fn compute_loss(&self, batch: Seq2SeqBatch<B>) -> Tensor<B, 1> {
        let [batch_size, target_len] = batch.target.dims();
        let input_text  = batch.target.clone().slice([0..batch_size, 0..target_len - 1]);
        let target_text = batch.target.slice([0..batch_size, 1..target_len]);

        let source_embeddings = self.dropout.forward(self.source_embedder.forward(batch.source));
        let input_embeddings  = self.dropout.forward(self.target_embedder.forward(input_text));

        let (_encoder_outputs, enc_final_state) =
            self.encoder.forward(source_embeddings, &batch.source_lengths);
        let (decoder_outputs, _) = self.decoder.forward(enc_final_state, input_embeddings);

        let token_logits = self.vocab_linear.forward(decoder_outputs); // [batch, steps, vocab]
        let [b, steps, vocab] = token_logits.dims();
        let token_logits = token_logits.reshape([b * steps, vocab]);
        let target_text  = target_text.reshape([b * steps]);

        masked_cross_entropy(token_logits, target_text, PAD_ID)
    }

    /// Greedily decode `number_to_gen` sequences of at most `max_len` tokens.
    ///
    /// Each sample starts from a zero hidden state and SOS. The end token
    /// stops a sample and is never part of the output.
    pub fn generate(
        &self,
        vocab:         &Vocabulary,
        number_to_gen: usize,
        max_len:       usize,
        device:        &B::Device,
    ) -> Vec<Vec<String>> {
        (0..number_to_gen)
            .map(|_| self.generate_one(vocab, max_len, device))
            .collect()
    }

    fn generate_one(&self, vocab: &Vocabulary, max_len: usize, device: &B::Device) -> Vec<String> {
        let mut hidden_states = RnnState::zeros(self.rnn_type.0, self.num_layers, 1, self.hidden_size, device);
        let mut generate_tokens = Vec::new();
        let mut input_idx = SOS_ID;
        let k = TOP_K.min(self.target_vocab_size);

        for gen_idx in 0..max_len {
            let input_seq = Tensor::<B, 1, Int>::from_ints([input_idx as i32], device).reshape([1, 1]);
            let decoder_input = self.target_embedder.forward(input_seq);
            let (outputs, next_states) = self.decoder.forward(hidden_states, decoder_input);
            hidden_states = next_states;

            let token_logits = self.vocab_linear.forward(outputs).reshape([1, self.target_vocab_size]);
            let log_probs = log_softmax(token_logits, 1);
            let (_, top_idx) = log_probs.topk_with_indices(k, 1);
            let token_idx = top_idx.slice([0..1, 0..1]).into_scalar().elem::<i64>() as usize;

            if token_idx == EOS_ID || gen_idx >= max_len {
                break;
            }
            let token = vocab
                .id_to_token(token_idx)
                .unwrap_or(SpecialToken::Unknown.as_str());
            generate_tokens.push(token.to_string());
            input_idx = token_idx;
        }
        generate_tokens
    }
}

/// Mean negative log-likelihood over positions whose target is not `pad_id`.
/// A batch with no such position yields 0.
pub fn masked_cross_entropy<B: Backend>(
    logits:  Tensor<B, 2>,
    targets: Tensor<B, 1, Int>,
    pad_id:  usize,
) -> Tensor<B, 1> {
    let [n, _] = logits.dims();
    let log_probs = log_softmax(logits, 1);
    let picked = log_probs.gather(1, targets.clone().reshape([n, 1])).reshape([n]);
    let keep = targets.not_equal_elem(pad_id as i32).float();
    let count = keep.clone().sum().clamp_min(1.0);
    (picked * keep).sum().neg() / count
}
