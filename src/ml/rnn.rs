// ============================================================
// Layer 5 — Recurrent Encoder and Decoder
// ============================================================
// Cells are built from two Linear projections (input → gates,
// hidden → gates) so one struct covers the three cell types:
//
//   Rnn:  h' = tanh(Wx·x + Wh·h)
//   Gru:  r = σ(.), z = σ(.), n = tanh(x_n + r ⊙ h_n)
//         h' = n + z ⊙ (h − n)
//   Lstm: i, f, g, o gates
//         c' = σ(f) ⊙ c + σ(i) ⊙ tanh(g)
//         h' = σ(o) ⊙ tanh(c')
//
// Hidden state layout matches the usual RNN convention:
//   [num_layers, batch, hidden]  (plus a cell tensor for LSTM)
//
// Encoder: masked steps (t >= length) leave the state unchanged,
// so the final state is the state after each row's last real
// token. A bidirectional encoder runs a second cell right to left
// and merges the two directions by Sum or Concat.

use burn::{
    module::Ignored,
    nn::{Initializer, Linear, LinearConfig},
    prelude::*,
    tensor::{
        activation::{sigmoid, tanh},
        TensorData,
    },
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RnnType {
    Rnn,
    Gru,
    Lstm,
}

impl RnnType {
    fn gate_count(self) -> usize {
        match self {
            RnnType::Rnn  => 1,
            RnnType::Gru  => 3,
            RnnType::Lstm => 4,
        }
    }

    pub fn has_cell_state(self) -> bool {
        self == RnnType::Lstm
    }
}

/// How the two directions of a bidirectional encoder are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineMethod {
    /// Each direction is `hidden_size` wide; outputs are added.
    Sum,
    /// Each direction is `hidden_size / 2` wide; outputs are concatenated.
    Concat,
}

/// State of one layer: hidden [batch, hidden] and, for LSTM, cell [batch, hidden].
#[derive(Debug, Clone)]
pub struct CellState<B: Backend> {
    pub hidden: Tensor<B, 2>,
    pub cell:   Option<Tensor<B, 2>>,
}

impl<B: Backend> CellState<B> {
    pub fn zeros(kind: RnnType, batch: usize, hidden: usize, device: &B::Device) -> Self {
        let hidden = Tensor::zeros([batch, hidden], device);
        let cell   = kind.has_cell_state().then(|| hidden.zeros_like());
        Self { hidden, cell }
    }
}

/// Stacked state: hidden [num_layers, batch, hidden] (+ cell for LSTM).
#[derive(Debug, Clone)]
pub struct RnnState<B: Backend> {
    pub hidden: Tensor<B, 3>,
    pub cell:   Option<Tensor<B, 3>>,
}

impl<B: Backend> RnnState<B> {
    pub fn zeros(
        kind:       RnnType,
        num_layers: usize,
        batch:      usize,
        hidden:     usize,
        device:     &B::Device,
    ) -> Self {
        let hidden = Tensor::zeros([num_layers, batch, hidden], device);
        let cell   = kind.has_cell_state().then(|| hidden.zeros_like());
        Self { hidden, cell }
    }

    /// State of layer `index` as 2D tensors.
    pub fn layer(&self, index: usize) -> CellState<B> {
        let pick = |t: &Tensor<B, 3>| {
            let [_, batch, hidden] = t.dims();
            t.clone()
                .slice([index..index + 1, 0..batch, 0..hidden])
                .reshape([batch, hidden])
        };
        CellState {
            hidden: pick(&self.hidden),
            cell:   self.cell.as_ref().map(pick),
        }
    }

    pub fn from_layers(layers: Vec<CellState<B>>) -> Self {
        let mut hiddens = Vec::with_capacity(layers.len());
        let mut cells   = Vec::with_capacity(layers.len());
        for layer in layers {
            hiddens.push(layer.hidden);
            if let Some(cell) = layer.cell {
                cells.push(cell);
            }
        }
        let cell = (!cells.is_empty()).then(|| Tensor::stack::<3>(cells, 0));
        Self { hidden: Tensor::stack::<3>(hiddens, 0), cell }
    }
}

#[derive(Module, Debug)]
pub struct RecurrentCell<B: Backend> {
    input_gates:  Linear<B>,
    hidden_gates: Linear<B>,
    kind:         Ignored<RnnType>,
    hidden_size:  usize,
}

impl<B: Backend> RecurrentCell<B> {
    pub fn new(kind: RnnType, d_input: usize, hidden_size: usize, device: &B::Device) -> Self {
        let gates = kind.gate_count() * hidden_size;
        let init  = Initializer::XavierNormal { gain: 1.0 };
        Self {
            input_gates:  LinearConfig::new(d_input, gates).with_initializer(init.clone()).init(device),
            hidden_gates: LinearConfig::new(hidden_size, gates).with_initializer(init).init(device),
            kind:         Ignored(kind),
            hidden_size,
        }
    }

    /// One time step: x [batch, d_input] → new state.
    pub fn step(&self, x: Tensor<B, 2>, state: CellState<B>) -> CellState<B> {
        let h  = state.hidden;
        let gi = self.input_gates.forward(x);
        let gh = self.hidden_gates.forward(h.clone());

        match self.kind.0 {
            RnnType::Rnn => CellState { hidden: tanh(gi + gh), cell: None },
            RnnType::Gru => {
                let r = sigmoid(self.gate(&gi, 0) + self.gate(&gh, 0));
                let z = sigmoid(self.gate(&gi, 1) + self.gate(&gh, 1));
                let n = tanh(self.gate(&gi, 2) + r * self.gate(&gh, 2));
                CellState { hidden: n.clone() + z * (h - n), cell: None }
            }
            RnnType::Lstm => {
                let gates = gi + gh;
                let c_prev = state.cell.unwrap_or_else(|| h.zeros_like());
                let i = sigmoid(self.gate(&gates, 0));
                let f = sigmoid(self.gate(&gates, 1));
                let g = tanh(self.gate(&gates, 2));
                let o = sigmoid(self.gate(&gates, 3));
                let c = f * c_prev + i * g;
                CellState { hidden: o * tanh(c.clone()), cell: Some(c) }
            }
        }
    }

    fn gate(&self, gates: &Tensor<B, 2>, index: usize) -> Tensor<B, 2> {
        let [batch, _] = gates.dims();
        let h = self.hidden_size;
        gates.clone().slice([0..batch, index * h..(index + 1) * h])
    }

    /// Run over inputs [batch, steps, d_input], left to right or right to left.
    ///
    /// `mask` [batch, steps] is 1.0 at real steps and 0.0 at padding. A
    /// masked step keeps the previous state and emits zeros.
    pub fn run(
        &self,
        inputs:  Tensor<B, 3>,
        init:    CellState<B>,
        mask:    Option<&Tensor<B, 2>>,
        reverse: bool,
    ) -> (Tensor<B, 3>, CellState<B>) {
        let [batch, steps, d_input] = inputs.dims();
        let order: Vec<usize> = if reverse {
            (0..steps).rev().collect()
        } else {
            (0..steps).collect()
        };

        let mut state = init;
        let mut outputs: Vec<Option<Tensor<B, 2>>> = vec![None; steps];

        for t in order {
            let x    = inputs.clone().slice([0..batch, t..t + 1, 0..d_input]).reshape([batch, d_input]);
            let next = self.step(x, state.clone());

            let output = match mask {
                Some(mask) => {
                    let keep = mask
                        .clone()
                        .slice([0..batch, t..t + 1])
                        .expand([batch, self.hidden_size]);
                    let hold = keep.ones_like() - keep.clone();
                    let output = next.hidden.clone() * keep.clone();
                    state = CellState {
                        hidden: next.hidden * keep.clone() + state.hidden * hold.clone(),
                        cell:   match (next.cell, state.cell) {
                            (Some(new), Some(old)) => Some(new * keep + old * hold),
                            (new, _) => new,
                        },
                    };
                    output
                }
                None => {
                    let output = next.hidden.clone();
                    state = next;
                    output
                }
            };
            outputs[t] = Some(output);
        }

        let outputs: Vec<Tensor<B, 2>> = outputs.into_iter().flatten().collect();
        (Tensor::stack::<3>(outputs, 1), state)
    }
}

/// 1.0 where `t < lengths[row]`, else 0.0 — shape [batch, steps].
pub fn length_mask<B: Backend>(lengths: &[usize], steps: usize, device: &B::Device) -> Tensor<B, 2> {
    let values: Vec<f32> = lengths
        .iter()
        .flat_map(|&len| (0..steps).map(move |t| if t < len { 1.0 } else { 0.0 }))
        .collect();
    Tensor::from_data(TensorData::new(values, [lengths.len(), steps]), device)
}

#[derive(Module, Debug)]
pub struct RnnEncoder<B: Backend> {
    forward_cells:  Vec<RecurrentCell<B>>,
    backward_cells: Vec<RecurrentCell<B>>,
    combine:        Ignored<CombineMethod>,
    kind:           Ignored<RnnType>,
    direction_size: usize,
}

impl<B: Backend> RnnEncoder<B> {
    pub fn new(
        kind:           RnnType,
        embedding_size: usize,
        hidden_size:    usize,
        num_layers:     usize,
        bidirectional:  bool,
        combine:        CombineMethod,
        device:         &B::Device,
    ) -> Self {
        let direction_size = match (bidirectional, combine) {
            (true, CombineMethod::Concat) => hidden_size / 2,
            _ => hidden_size,
        };
        let build = |count: usize| -> Vec<RecurrentCell<B>> {
            (0..count)
                .map(|layer| {
                    let d_input = if layer == 0 { embedding_size } else { hidden_size };
                    RecurrentCell::new(kind, d_input, direction_size, device)
                })
                .collect()
        };
        Self {
            forward_cells:  build(num_layers),
            backward_cells: if bidirectional { build(num_layers) } else { Vec::new() },
            combine:        Ignored(combine),
            kind:           Ignored(kind),
            direction_size,
        }
    }

    pub fn is_bidirectional(&self) -> bool {
        !self.backward_cells.is_empty()
    }

    /// embeddings [batch, steps, embedding] → (outputs [batch, steps, hidden], final state)
    pub fn forward(&self, embeddings: Tensor<B, 3>, lengths: &[usize]) -> (Tensor<B, 3>, RnnState<B>) {
        let [batch, steps, _] = embeddings.dims();
        let device = embeddings.device();
        let mask   = length_mask::<B>(lengths, steps, &device);

        let mut input  = embeddings;
        let mut finals = Vec::with_capacity(self.forward_cells.len());

        for (layer, cell) in self.forward_cells.iter().enumerate() {
            let zero = CellState::zeros(self.kind.0, batch, self.direction_size, &device);
            let (fwd_out, fwd_state) = cell.run(input.clone(), zero.clone(), Some(&mask), false);

            let (output, state) = match self.backward_cells.get(layer) {
                Some(back) => {
                    let (bwd_out, bwd_state) = back.run(input, zero, Some(&mask), true);
                    (
                        self.merge(fwd_out, bwd_out),
                        CellState {
                            hidden: self.merge(fwd_state.hidden, bwd_state.hidden),
                            cell:   match (fwd_state.cell, bwd_state.cell) {
                                (Some(f), Some(b)) => Some(self.merge(f, b)),
                                _ => None,
                            },
                        },
                    )
                }
                None => (fwd_out, fwd_state),
            };
            finals.push(state);
            input = output;
        }

        (input, RnnState::from_layers(finals))
    }

    fn merge<const D: usize>(&self, forward: Tensor<B, D>, backward: Tensor<B, D>) -> Tensor<B, D> {
        match self.combine.0 {
            CombineMethod::Sum    => forward + backward,
            CombineMethod::Concat => Tensor::cat(vec![forward, backward], D - 1),
        }
    }
}

#[derive(Module, Debug)]
pub struct RnnDecoder<B: Backend> {
    cells: Vec<RecurrentCell<B>>,
}

impl<B: Backend> RnnDecoder<B> {
    pub fn new(
        kind:           RnnType,
        embedding_size: usize,
        hidden_size:    usize,
        num_layers:     usize,
        device:         &B::Device,
    ) -> Self {
        let cells = (0..num_layers)
            .map(|layer| {
                let d_input = if layer == 0 { embedding_size } else { hidden_size };
                RecurrentCell::new(kind, d_input, hidden_size, device)
            })
            .collect();
        Self { cells }
    }

    /// (state, inputs [batch, steps, embedding]) → (outputs [batch, steps, hidden], updated state)
    pub fn forward(&self, state: RnnState<B>, inputs: Tensor<B, 3>) -> (Tensor<B, 3>, RnnState<B>) {
        let mut input  = inputs;
        let mut finals = Vec::with_capacity(self.cells.len());
        for (layer, cell) in self.cells.iter().enumerate() {
            let (output, last) = cell.run(input, state.layer(layer), None, false);
            finals.push(last);
            input = output;
        }
        (input, RnnState::from_layers(finals))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn max_abs_diff(a: Tensor<TestBackend, 2>, b: Tensor<TestBackend, 2>) -> f32 {
        (a - b).abs().max().into_scalar()
    }

    #[test]
    fn test_length_mask_values() {
        let device = Default::default();
        let mask   = length_mask::<TestBackend>(&[3, 1], 3, &device);
        let values: Vec<f32> = mask.into_data().iter::<f32>().collect();
        assert_eq!(values, vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_cell_output_shapes() {
        let device = Default::default();
        for kind in [RnnType::Rnn, RnnType::Gru, RnnType::Lstm] {
            let cell   = RecurrentCell::<TestBackend>::new(kind, 5, 7, &device);
            let inputs = Tensor::<TestBackend, 3>::ones([2, 4, 5], &device);
            let zero   = CellState::zeros(kind, 2, 7, &device);
            let (out, state) = cell.run(inputs, zero, None, false);
            assert_eq!(out.dims(), [2, 4, 7]);
            assert_eq!(state.hidden.dims(), [2, 7]);
            assert_eq!(state.cell.is_some(), kind == RnnType::Lstm);
        }
    }

    #[test]
    fn test_padding_does_not_change_final_state() {
        let device  = Default::default();
        let encoder = RnnEncoder::<TestBackend>::new(RnnType::Gru, 3, 4, 2, true, CombineMethod::Sum, &device);

        let padded = Tensor::<TestBackend, 3>::random(
            [1, 3, 3],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let trimmed = padded.clone().slice([0..1, 0..2, 0..3]);

        let (_, with_pad) = encoder.forward(padded, &[2]);
        let (_, exact)    = encoder.forward(trimmed, &[2]);

        for layer in 0..2 {
            let diff = max_abs_diff(with_pad.layer(layer).hidden, exact.layer(layer).hidden);
            assert!(diff < 1e-5, "layer {layer} differs by {diff}");
        }
    }

    #[test]
    fn test_concat_encoder_produces_full_hidden_width() {
        let device  = Default::default();
        let encoder = RnnEncoder::<TestBackend>::new(RnnType::Lstm, 3, 6, 2, true, CombineMethod::Concat, &device);
        let inputs  = Tensor::<TestBackend, 3>::ones([2, 4, 3], &device);
        let (out, state) = encoder.forward(inputs, &[4, 2]);
        assert!(encoder.is_bidirectional());
        assert_eq!(out.dims(), [2, 4, 6]);
        assert_eq!(state.hidden.dims(), [2, 2, 6]);
        assert_eq!(state.cell.map(|c| c.dims()), Some([2, 2, 6]));
    }

    #[test]
    fn test_decoder_continues_from_given_state() {
        let device  = Default::default();
        let decoder = RnnDecoder::<TestBackend>::new(RnnType::Lstm, 3, 4, 2, &device);
        let state   = RnnState::zeros(RnnType::Lstm, 2, 1, 4, &device);
        let inputs  = Tensor::<TestBackend, 3>::ones([1, 5, 3], &device);
        let (out, next) = decoder.forward(state, inputs);
        assert_eq!(out.dims(), [1, 5, 4]);
        assert_eq!(next.hidden.dims(), [2, 1, 4]);
    }
}
